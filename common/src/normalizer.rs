//! エレメントコードの符号正規化
//!
//! スプレッドシート由来の値は「＋」「ー」「－」「−」など見た目の似た
//! 符号が混在する。照合前にASCIIの `+` / `-` へ寄せる。

/// 全角プラス (U+FF0B)
pub const FULLWIDTH_PLUS: char = '\u{FF0B}';
/// 長音記号 (U+30FC)
pub const KATAKANA_PROLONGED_MARK: char = '\u{30FC}';
/// 全角ハイフンマイナス (U+FF0D)
pub const FULLWIDTH_HYPHEN: char = '\u{FF0D}';
/// マイナス記号 (U+2212)
pub const MINUS_SIGN: char = '\u{2212}';

/// `+` と同一視する文字
pub const PLUS_VARIANTS: [char; 2] = ['+', FULLWIDTH_PLUS];
/// `-` と同一視する文字
pub const MINUS_VARIANTS: [char; 4] = ['-', KATAKANA_PROLONGED_MARK, FULLWIDTH_HYPHEN, MINUS_SIGN];

/// 正規化後の符号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// ASCII表記
    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }

    /// この符号と同一視される全角・記号類（ASCII以外）
    pub fn variants(self) -> &'static [char] {
        match self {
            Sign::Plus => &PLUS_VARIANTS[1..],
            Sign::Minus => &MINUS_VARIANTS[1..],
        }
    }
}

/// 1文字を符号クラスに分類
pub fn classify_sign(ch: char) -> Option<Sign> {
    if PLUS_VARIANTS.contains(&ch) {
        Some(Sign::Plus)
    } else if MINUS_VARIANTS.contains(&ch) {
        Some(Sign::Minus)
    } else {
        None
    }
}

/// 符号類をASCIIへ寄せる。それ以外の文字はそのまま。
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .map(|ch| classify_sign(ch).map(Sign::as_char).unwrap_or(ch))
        .collect()
}

/// 正規化済みコードから末尾の符号を1つだけ取り除く
pub fn base_code(normalized: &str) -> &str {
    normalized
        .strip_suffix('+')
        .or_else(|| normalized.strip_suffix('-'))
        .unwrap_or(normalized)
}

/// 正規化済みコード末尾の符号
pub fn sign_of(normalized: &str) -> Option<Sign> {
    match normalized.chars().last() {
        Some('+') => Some(Sign::Plus),
        Some('-') => Some(Sign::Minus),
        _ => None,
    }
}
