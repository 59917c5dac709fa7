//! Element Compat Common Library
//!
//! 相性表デコーダと照合エンジン本体。I/Oを持たない純粋な処理のみ。

pub mod types;
pub mod error;
pub mod range;
pub mod decoder;
pub mod normalizer;
pub mod pattern;
pub mod matcher;
pub mod store;
pub mod export;

pub use types::{
    CompatibilityRecord, CompatibilityType, MatchGroup, MatchQuery, MatchResponse, PersonCodes,
    RecordPayload, StoredRecord,
};
pub use error::{Error, Result};
pub use range::{address_to_index, index_to_address, RangeDescriptor};
pub use decoder::{decode_blocks, find_anchors, Grid, HARD_MARKER, PEACH_MARKER};
pub use normalizer::{base_code, normalize_code, sign_of, Sign};
pub use pattern::{expand_patterns, PatternSet};
pub use matcher::{find_compatibility, group_matches, PatternQuery};
pub use store::{MemoryRecordStore, RecordEdit, RecordStore, SlotEdit};
