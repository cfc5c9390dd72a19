pub type DeckcastResult<T> = Result<T, DeckcastError>;

#[derive(thiserror::Error, Debug)]
pub enum DeckcastError {
    /// The source document could not be opened, rasterized, or contained zero pages.
    #[error("document error: {0}")]
    Document(String),

    /// No slides survived binding; a conversion with nothing to show is a hard failure.
    #[error("empty timeline: conversion produced no slides")]
    EmptyTimeline,

    /// The external encoder could not be spawned or exited with a failure status.
    #[error("encode error: {0}")]
    Encode(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckcastError {
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            DeckcastError::document("x")
                .to_string()
                .contains("document error:")
        );
        assert!(
            DeckcastError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert!(
            DeckcastError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            DeckcastError::EmptyTimeline
                .to_string()
                .contains("empty timeline")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = DeckcastError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
