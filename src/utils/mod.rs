//! Utility modules

pub mod dom;
pub mod format;
pub mod log_trace;
pub mod sheetjs;
