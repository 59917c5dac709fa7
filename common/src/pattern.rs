//! 照合パターン展開
//!
//! ユーザー側のコード1つから、ストアに保存されうる同値な表記の集合を作る。
//!
//! - 正規化形 (`F+`) と符号なしの基底 (`F`) は必ず含む
//! - 符号に応じて全角・記号表記を足す（`+` なら `＋`、`-` なら `ー` `－` `−`）
//! - 入力そのものが正規化形と違えば、それも含む
//!
//! `X+` と `X-` の展開結果が共有するのは基底 `X` だけ。

use crate::normalizer::{base_code, normalize_code, sign_of};

/// 重複なし・挿入順保持のパターン集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未登録なら追加する。空文字は追加しない。
    pub fn insert(&mut self, pattern: impl Into<String>) -> bool {
        let pattern = pattern.into();
        if pattern.is_empty() || self.contains(&pattern) {
            return false;
        }
        self.patterns.push(pattern);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.patterns.iter().any(|p| p == value)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.patterns
    }
}

/// ユーザーコードを照合パターン集合に展開する
///
/// 空文字（前後空白のみを含む）は空集合を返す。
pub fn expand_patterns(code: &str) -> PatternSet {
    let mut set = PatternSet::new();

    let raw = code.trim();
    if raw.is_empty() {
        return set;
    }

    let normalized = normalize_code(raw);
    let base = base_code(&normalized);

    set.insert(normalized.as_str());
    set.insert(base);

    if let Some(sign) = sign_of(&normalized) {
        for variant in sign.variants() {
            set.insert(format!("{}{}", base, variant));
        }
    }

    if raw != normalized {
        set.insert(raw);
    }

    set
}

/// 任意入力（None可）版
pub fn expand_optional(code: Option<&str>) -> PatternSet {
    code.map(expand_patterns).unwrap_or_default()
}
