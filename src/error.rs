/// Error types for trim editing and storage access
use thiserror::Error;

/// Rejections raised while editing a trim window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrimError {
    #[error("End must be greater than Start ({start}s >= {end}s)")]
    InvalidWindow { start: u32, end: u32 },
}

/// Failures crossing the chrome.storage / chrome.tabs boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend rejected the request: {0}")]
    Backend(String),

    #[error("failed to decode stored trims: {0}")]
    Decode(#[source] serde_wasm_bindgen::Error),

    #[error("failed to encode trims: {0}")]
    Encode(#[source] serde_wasm_bindgen::Error),

    #[error(transparent)]
    Invalid(#[from] TrimError),
}

impl StoreError {
    /// Wrap a rejected JS promise; the payload is only good for display
    pub fn backend(err: wasm_bindgen::JsValue) -> Self {
        StoreError::Backend(format!("{:?}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window_message() {
        let err = TrimError::InvalidWindow { start: 30, end: 20 };
        assert_eq!(err.to_string(), "End must be greater than Start (30s >= 20s)");
    }

    #[test]
    fn test_store_error_wraps_trim_error() {
        let err: StoreError = TrimError::InvalidWindow { start: 5, end: 5 }.into();
        assert!(matches!(err, StoreError::Invalid(TrimError::InvalidWindow { .. })));
        assert_eq!(err.to_string(), "End must be greater than Start (5s >= 5s)");
    }
}
