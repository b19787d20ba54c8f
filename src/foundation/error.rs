/// Convenience result type used across evrender.
pub type EvResult<T> = Result<T, EvError>;

/// Top-level error taxonomy used by the renderer, compositor and stage runners.
///
/// Every variant aborts the operation that produced it; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum EvError {
    /// Invalid user-provided parameters (frame rate, decay constant, sizes, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// A required input (shard directory, timestamp file, video) does not exist or is empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// An input exists but carries no usable data.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// The output video sink could not be opened (bad path or unsupported codec).
    #[error("sink open error: {0}")]
    SinkOpen(String),

    /// Two sources that must share a resolution do not.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// A source video's frame rate is missing or non-positive.
    #[error("unknown frame rate: {0}")]
    UnknownFrameRate(String),

    /// Failure while reading shards or decoding video frames.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure while writing frames to a sink.
    #[error("encode error: {0}")]
    Encode(String),

    /// An external stage process could not be launched or exited unsuccessfully.
    #[error("external stage error: {0}")]
    ExternalStage(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EvError {
    /// Build a [`EvError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EvError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`EvError::EmptyData`] value.
    pub fn empty_data(msg: impl Into<String>) -> Self {
        Self::EmptyData(msg.into())
    }

    /// Build a [`EvError::SinkOpen`] value.
    pub fn sink_open(msg: impl Into<String>) -> Self {
        Self::SinkOpen(msg.into())
    }

    /// Build a [`EvError::SizeMismatch`] value.
    pub fn size_mismatch(msg: impl Into<String>) -> Self {
        Self::SizeMismatch(msg.into())
    }

    /// Build a [`EvError::UnknownFrameRate`] value.
    pub fn unknown_frame_rate(msg: impl Into<String>) -> Self {
        Self::UnknownFrameRate(msg.into())
    }

    /// Build a [`EvError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`EvError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`EvError::ExternalStage`] value.
    pub fn external_stage(msg: impl Into<String>) -> Self {
        Self::ExternalStage(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
