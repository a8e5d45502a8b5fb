/// Everything that can go wrong between a submit and its reply.
///
/// Validation errors abort before any request is sent. Transport errors are
/// the only retriable kind. Persistence problems never show up here; the
/// settings store recovers from those on its own.
#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("message is empty")]
    EmptyPrompt,
    #[error("message too long: {len} characters, maximum is {max}")]
    PromptTooLong { len: usize, max: usize },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("unexpected reply from server: {0}")]
    Protocol(String),
}

impl SubmitError {
    /// Only connection-level failures are worth retrying; an HTTP status or
    /// a malformed body would just come back the same.
    pub fn is_transport(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}
