//! Error types shared by every component

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum UiError {
    /// Integration mistake: the page has no element with this id
    #[error("Container with id \"{0}\" not found")]
    ContainerNotFound(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Excel kütüphanesi yüklenemedi: {0}")]
    ExportLibrary(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A caller-supplied callback reported failure
    #[error("{0}")]
    Callback(String),
}

impl UiError {
    pub fn dom(e: JsValue) -> Self {
        UiError::Dom(format!("{:?}", e))
    }
}

impl From<serde_json::Error> for UiError {
    fn from(e: serde_json::Error) -> Self {
        UiError::InvalidOptions(e.to_string())
    }
}

impl From<csv::Error> for UiError {
    fn from(e: csv::Error) -> Self {
        UiError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_not_found_message() {
        let err = UiError::ContainerNotFound("comparison-table-container".to_string());
        assert_eq!(
            err.to_string(),
            "Container with id \"comparison-table-container\" not found"
        );
    }

    #[test]
    fn test_options_error_from_serde() {
        let err: UiError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, UiError::InvalidOptions(_)));
    }
}
