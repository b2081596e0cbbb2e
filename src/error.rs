//! Error types for the commit advisor library
//!
//! Library code returns [`AdvisorError`]; the CLI wraps it in `anyhow`.

use thiserror::Error;

/// Errors that can occur while loading, encoding, training or searching
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Missing feature '{feature}' in input record")]
    MissingFeature { feature: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Search space too large: {} candidates exceed the cap of {cap}", display_size(.size))]
    SearchSpaceTooLarge { size: Option<u128>, cap: u64 },

    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Training failed: {0}")]
    Training(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_size(size: &Option<u128>) -> String {
    match size {
        Some(n) => n.to_string(),
        None => "more than 2^128".to_string(),
    }
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_space_message() {
        let err = AdvisorError::SearchSpaceTooLarge {
            size: Some(1_000_000),
            cap: 100_000,
        };
        assert_eq!(
            err.to_string(),
            "Search space too large: 1000000 candidates exceed the cap of 100000"
        );

        let overflow = AdvisorError::SearchSpaceTooLarge { size: None, cap: 10 };
        assert!(overflow.to_string().contains("more than 2^128"));
    }

    #[test]
    fn test_missing_feature_message() {
        let err = AdvisorError::MissingFeature {
            feature: "developer".into(),
        };
        assert_eq!(err.to_string(), "Missing feature 'developer' in input record");
    }
}
