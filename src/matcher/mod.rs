//! 相性照合（CLI側）
//!
//! クエリの組み立て・読み込みと結果の表示。照合そのものは共通ライブラリ。

use crate::error::{CompatError, Result};
use element_compat_common::{expand_patterns, MatchQuery, MatchResponse, PersonCodes};
use std::path::Path;

/// 引数からクエリを組み立てる（空文字は未指定扱い）
pub fn query_from_args(
    a_valuable: Option<&str>,
    a_problem: Option<&str>,
    b_valuable: Option<&str>,
    b_problem: Option<&str>,
) -> MatchQuery {
    let code = |v: Option<&str>| {
        v.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    MatchQuery {
        person_a: PersonCodes {
            valuable_code: code(a_valuable),
            problem_code: code(a_problem),
        },
        person_b: PersonCodes {
            valuable_code: code(b_valuable),
            problem_code: code(b_problem),
        },
    }
}

/// `{"personA": {...}, "personB": {...}}` 形式のクエリファイルを読む
pub fn load_query(path: &Path) -> Result<MatchQuery> {
    if !path.exists() {
        return Err(CompatError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let query: MatchQuery = serde_json::from_str(&content)?;
    Ok(query)
}

/// コードの展開結果を1行で
pub fn describe_patterns(code: &str) -> String {
    let patterns = expand_patterns(code);
    if patterns.is_empty() {
        return "(なし)".to_string();
    }
    patterns.iter().collect::<Vec<_>>().join(", ")
}

/// 照合結果を人が読む形に整形
pub fn format_response(response: &MatchResponse) -> String {
    if response.results.is_empty() {
        return "該当する相性はありません".to_string();
    }

    let mut lines = vec![format!("該当: {}件", response.total_matches)];
    for group in &response.results {
        lines.push(String::new());
        lines.push(format!("■ {} (type {}) {}件", group.name, group.compatibility_type, group.count));
        if !group.description.is_empty() {
            lines.push(format!("  {}", group.description));
        }
        for payload in &group.records {
            let slot = |v: &Option<String>| v.clone().unwrap_or_default();
            lines.push(format!(
                "  A: {} / {}   B: {} / {}",
                slot(&payload.a_peach),
                slot(&payload.a_hard),
                slot(&payload.b_peach),
                slot(&payload.b_hard),
            ));
        }
    }
    lines.join("\n")
}
