pub type PlacelapseResult<T> = Result<T, PlacelapseError>;

#[derive(thiserror::Error, Debug)]
pub enum PlacelapseError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("action source error: {0}")]
    Source(String),

    #[error("encode error: {0}")]
    Encode(String),

    /// The reading side of a frame sink went away (e.g. the encoder process exited).
    #[error("sink closed: {0}")]
    SinkClosed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlacelapseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn sink_closed(msg: impl Into<String>) -> Self {
        Self::SinkClosed(msg.into())
    }

    pub fn is_sink_closed(&self) -> bool {
        matches!(self, Self::SinkClosed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PlacelapseError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            PlacelapseError::source("x")
                .to_string()
                .contains("action source error:")
        );
        assert!(
            PlacelapseError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert!(
            PlacelapseError::sink_closed("x")
                .to_string()
                .contains("sink closed:")
        );
    }

    #[test]
    fn only_sink_closed_is_recognized_as_broken_pipe() {
        assert!(PlacelapseError::sink_closed("pipe").is_sink_closed());
        assert!(!PlacelapseError::encode("pipe").is_sink_closed());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PlacelapseError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
