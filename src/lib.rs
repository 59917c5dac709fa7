//! element-compat
//!
//! ワークブック上の相性表を取り込み、2人分のエレメントコードで照合するCLIのライブラリ部。

pub mod admin;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod importer;
pub mod logging;
pub mod matcher;
pub mod store;
