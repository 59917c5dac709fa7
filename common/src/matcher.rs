//! 相性照合エンジン
//!
//! 2人分（価値コード・課題コード）の4コードをそれぞれパターン展開し、
//! 4スロットすべてが一致したレコードをスキーム単位にまとめる。
//!
//! ストア側の値が基底のみ（`F`）なら符号を問わず一致し、
//! 符号付き（`F+`）なら同じ符号にしか一致しない。

use crate::error::Result;
use crate::pattern::{expand_optional, PatternSet};
use crate::store::RecordStore;
use crate::types::{CompatibilityRecord, CompatibilityType, MatchGroup, MatchQuery, MatchResponse};
use std::collections::{BTreeMap, HashMap};

/// 4スロット分の展開済みパターン
#[derive(Debug, Clone, Default)]
pub struct PatternQuery {
    pub a_valuable: PatternSet,
    pub a_problem: PatternSet,
    pub b_valuable: PatternSet,
    pub b_problem: PatternSet,
}

impl PatternQuery {
    pub fn from_query(query: &MatchQuery) -> Self {
        Self {
            a_valuable: expand_optional(query.person_a.valuable_code.as_deref()),
            a_problem: expand_optional(query.person_a.problem_code.as_deref()),
            b_valuable: expand_optional(query.person_b.valuable_code.as_deref()),
            b_problem: expand_optional(query.person_b.problem_code.as_deref()),
        }
    }

    /// どれか1つでも空集合なら一致しうるレコードはない
    pub fn is_satisfiable(&self) -> bool {
        !(self.a_valuable.is_empty()
            || self.a_problem.is_empty()
            || self.b_valuable.is_empty()
            || self.b_problem.is_empty())
    }

    /// 4スロットすべてがパターンに含まれるか
    pub fn matches(&self, record: &CompatibilityRecord) -> bool {
        slot_matches(&self.a_valuable, record.a_peach.as_deref())
            && slot_matches(&self.a_problem, record.a_hard.as_deref())
            && slot_matches(&self.b_valuable, record.b_peach.as_deref())
            && slot_matches(&self.b_problem, record.b_hard.as_deref())
    }
}

/// 保存値が空（None）のスロットは一致しない
fn slot_matches(patterns: &PatternSet, stored: Option<&str>) -> bool {
    stored.is_some_and(|value| patterns.contains(value))
}

/// ストアに照会して結果をまとめる
pub fn find_compatibility<S>(store: &S, query: &MatchQuery) -> Result<MatchResponse>
where
    S: RecordStore + ?Sized,
{
    let patterns = PatternQuery::from_query(query);
    if !patterns.is_satisfiable() {
        tracing::debug!("空のパターンがあるため照合をスキップ");
        return Ok(MatchResponse::default());
    }

    let hits = store.find_matching(&patterns)?;
    let types = store.compatibility_types()?;
    let response = group_matches(hits, &types);

    tracing::info!(
        total = response.total_matches,
        groups = response.results.len(),
        "相性照合完了"
    );
    Ok(response)
}

/// ヒットしたレコードをスキームごとにまとめ、名称・説明を付ける
///
/// メタデータがないスキームは「type N」として扱う。
pub fn group_matches(hits: Vec<CompatibilityRecord>, types: &[CompatibilityType]) -> MatchResponse {
    let metadata: HashMap<u32, &CompatibilityType> = types.iter().map(|t| (t.id, t)).collect();
    let total_matches = hits.len();

    let mut grouped: BTreeMap<u32, Vec<CompatibilityRecord>> = BTreeMap::new();
    for record in hits {
        grouped.entry(record.compatibility_type).or_default().push(record);
    }

    let results = grouped
        .into_iter()
        .map(|(compatibility_type, records)| {
            let (name, description) = match metadata.get(&compatibility_type) {
                Some(meta) => (meta.name.clone(), meta.description.clone()),
                None => (format!("type {}", compatibility_type), String::new()),
            };

            MatchGroup {
                compatibility_type,
                name,
                description,
                count: records.len(),
                records: records.iter().map(CompatibilityRecord::payload).collect(),
            }
        })
        .collect();

    MatchResponse { results, total_matches }
}
