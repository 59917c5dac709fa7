//! 相性データの型定義
//!
//! CLIとストアで共有される型:
//! - CompatibilityRecord: 相性表から復元した1ブロック分のレコード
//! - StoredRecord: ストアが採番したIDつきのレコード
//! - CompatibilityType: 相性スキーム（名称・説明）
//! - MatchQuery / MatchResponse: 照合の入出力

use serde::{Deserialize, Serialize};

/// 相性レコード
///
/// `row_index` / `col_index` はシート上の絶対位置（0始まり）。
/// 監査・管理画面での修正用であり、照合には使わない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRecord {
    pub compatibility_type: u32,

    #[serde(default)]
    pub sheet_name: String,

    #[serde(default)]
    pub range: String,

    #[serde(default)]
    pub a_peach: Option<String>,  // Aさんの価値コード

    #[serde(default)]
    pub a_hard: Option<String>,   // Aさんの課題コード

    #[serde(default)]
    pub b_peach: Option<String>,  // Bさんの価値コード

    #[serde(default)]
    pub b_hard: Option<String>,   // Bさんの課題コード

    #[serde(default)]
    pub row_index: u32,

    #[serde(default)]
    pub col_index: u32,
}

impl CompatibilityRecord {
    /// 4スロットすべてが空か
    pub fn is_payload_empty(&self) -> bool {
        self.a_peach.is_none()
            && self.a_hard.is_none()
            && self.b_peach.is_none()
            && self.b_hard.is_none()
    }

    /// 照合結果に載せるペイロード部分
    pub fn payload(&self) -> RecordPayload {
        RecordPayload {
            a_peach: self.a_peach.clone(),
            a_hard: self.a_hard.clone(),
            b_peach: self.b_peach.clone(),
            b_hard: self.b_hard.clone(),
        }
    }
}

/// ストア上のレコード（ID付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: u64,
    #[serde(flatten)]
    pub record: CompatibilityRecord,
}

/// 相性スキームのメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityType {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 1人分のコード（生年月日ルックアップの出力）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonCodes {
    #[serde(default)]
    pub valuable_code: Option<String>,
    #[serde(default)]
    pub problem_code: Option<String>,
}

impl PersonCodes {
    pub fn new(valuable: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            valuable_code: Some(valuable.into()),
            problem_code: Some(problem.into()),
        }
    }
}

/// 照合クエリ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub person_a: PersonCodes,
    pub person_b: PersonCodes,
}

/// 照合でヒットしたレコードの中身
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub a_peach: Option<String>,
    pub a_hard: Option<String>,
    pub b_peach: Option<String>,
    pub b_hard: Option<String>,
}

/// スキーム単位の照合結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGroup {
    pub compatibility_type: u32,
    pub name: String,
    pub description: String,
    pub count: usize,
    pub records: Vec<RecordPayload>,
}

/// 照合結果全体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub results: Vec<MatchGroup>,
    pub total_matches: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialize_camel_case() {
        let record = CompatibilityRecord {
            compatibility_type: 5,
            sheet_name: "S".to_string(),
            range: "A1:C2".to_string(),
            a_peach: Some("F+".to_string()),
            a_hard: None,
            b_peach: Some("T-".to_string()),
            b_hard: Some("E-".to_string()),
            row_index: 0,
            col_index: 1,
        };

        let json = serde_json::to_string(&record).expect("シリアライズ失敗");
        assert!(json.contains("\"compatibilityType\":5"));
        assert!(json.contains("\"sheetName\":\"S\""));
        assert!(json.contains("\"aPeach\":\"F+\""));
        assert!(json.contains("\"aHard\":null"));
        assert!(json.contains("\"rowIndex\":0"));
        assert!(json.contains("\"colIndex\":1"));
    }

    #[test]
    fn test_stored_record_is_flat() {
        let stored = StoredRecord {
            id: 7,
            record: CompatibilityRecord {
                compatibility_type: 2,
                a_peach: Some("W".to_string()),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&stored).expect("シリアライズ失敗");
        assert_eq!(value["id"], 7);
        assert_eq!(value["compatibilityType"], 2);
        assert_eq!(value["aPeach"], "W");
    }

    #[test]
    fn test_match_query_deserialize_with_nulls() {
        let json = r#"{
            "personA": {"valuableCode": "F+", "problemCode": null},
            "personB": {"valuableCode": "E+"}
        }"#;

        let query: MatchQuery = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(query.person_a.valuable_code.as_deref(), Some("F+"));
        assert_eq!(query.person_a.problem_code, None);
        assert_eq!(query.person_b.problem_code, None);
    }

    #[test]
    fn test_match_response_field_names() {
        let response = MatchResponse {
            results: vec![MatchGroup {
                compatibility_type: 1,
                name: "恋愛".to_string(),
                description: String::new(),
                count: 0,
                records: vec![],
            }],
            total_matches: 0,
        };

        let json = serde_json::to_string(&response).expect("シリアライズ失敗");
        assert!(json.contains("\"totalMatches\":0"));
        assert!(json.contains("\"compatibilityType\":1"));
        assert!(json.contains("\"count\":0"));
    }

    #[test]
    fn test_payload_empty() {
        assert!(CompatibilityRecord::default().is_payload_empty());

        let partial = CompatibilityRecord {
            b_hard: Some("T".to_string()),
            ..Default::default()
        };
        assert!(!partial.is_payload_empty());
    }
}
