//! Export core modules shared across the CLI and other wrappers.

#[cfg(feature = "excel")]
pub mod excel_core;
