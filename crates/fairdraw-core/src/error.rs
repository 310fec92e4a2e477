use thiserror::Error;

/// Failure modes of session operations.
///
/// Every variant is recoverable: the session stays usable after any error,
/// and the `Display` rendering is the user-visible message.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A generate call asked for more items than the range holds.
    #[error("batch size {k} cannot exceed N={n}")]
    Validation { k: u32, n: u32 },

    /// The payload is not valid JSON, or a counts key is not an integer.
    #[error("could not parse progress payload: {0}")]
    Parse(String),

    /// A full-progress payload is missing a required field.
    #[error("full progress payload is missing required field `{0}`")]
    Schema(&'static str),
}
