//! The submit flow: `Idle → Submitting → {Succeeded, Failed} → Idle`.
//!
//! One flow instance per input form. While a submit is in flight the flow
//! reports busy and refuses another one; that is the single-flight guard,
//! advisory by design since nothing else shares the transcript.

use std::time::Duration;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use settings::Settings;
use transcript::{ExchangeId, Transcript};

use crate::{Outcome, SubmitClient, SubmitError};

/// What happens to the page after a successful round-trip. `Reload`
/// deliberately discards all client state, matching a full page reload;
/// `InPlace` patches the placeholder and keeps the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    #[default]
    InPlace,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Idle,
    Submitting,
}

/// How one submit ended, for the caller's UI to reflect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport {
    /// A submit was already in flight; nothing was done.
    Busy,
    /// Empty prompt after trimming; silently ignored.
    Skipped,
    /// Validation failed with a message to show; nothing was sent.
    Rejected(String),
    /// The placeholder now holds the reply.
    Replied(ExchangeId),
    /// Reload policy: the transcript was cleared and the page refetched.
    Reloaded,
    /// The placeholder now holds the error text; input is enabled again.
    Failed(ExchangeId),
}

pub struct SubmitFlow {
    state: FlowState,
    max_prompt_len: usize,
    policy: SuccessPolicy,
    max_attempts: usize,
    retry_delay: Duration,
}

impl SubmitFlow {
    pub fn new(
        max_prompt_len: usize,
        policy: SuccessPolicy,
        max_attempts: usize,
        retry_delay: Duration,
    ) -> Self {
        Self {
            state: FlowState::Idle,
            max_prompt_len,
            policy,
            max_attempts,
            retry_delay,
        }
    }

    /// True while a request is in flight; callers keep the input disabled
    /// and the loading indicator visible for exactly this period.
    pub fn is_busy(&self) -> bool {
        self.state == FlowState::Submitting
    }

    /// Runs one prompt through validation, optimistic rendering, the
    /// network round-trip, and reconciliation. Errors end up inside the
    /// placeholder, never returned; every path leaves the flow idle.
    pub async fn submit(
        &mut self,
        raw_prompt: &str,
        settings: &Settings,
        client: &SubmitClient,
        transcript: &mut Transcript,
    ) -> SubmitReport {
        if self.is_busy() {
            warn!("submit refused: a request is already in flight");
            return SubmitReport::Busy;
        }

        let prompt = match validate_prompt(raw_prompt, self.max_prompt_len) {
            Ok(prompt) => prompt,
            Err(SubmitError::EmptyPrompt) => return SubmitReport::Skipped,
            Err(e) => return SubmitReport::Rejected(e.to_string()),
        };

        self.state = FlowState::Submitting;
        let id = transcript.append_pending(prompt);

        let result = client
            .submit_with_retry(prompt, settings, self.max_attempts, self.retry_delay)
            .await;
        self.state = FlowState::Idle;

        match result {
            Ok(Outcome::Replied(text)) => match self.policy {
                SuccessPolicy::InPlace => {
                    transcript.resolve(id, &text);
                    SubmitReport::Replied(id)
                }
                SuccessPolicy::Reload => {
                    if let Err(e) = client.fetch_page().await {
                        warn!("page refetch after success failed: {}", e);
                    }
                    transcript.clear();
                    SubmitReport::Reloaded
                }
            },
            // A redirect is a navigation regardless of policy.
            Ok(Outcome::Redirected(url)) => {
                if let Err(e) = client.fetch(&url).await {
                    warn!("following redirect to {} failed: {}", url, e);
                }
                transcript.clear();
                SubmitReport::Reloaded
            }
            Err(e) => {
                error!("submit failed: {}", e);
                transcript.fail(id, &format!("Error: {}", e));
                SubmitReport::Failed(id)
            }
        }
    }
}

/// Trims the prompt and enforces the configured maximum length.
pub fn validate_prompt(raw: &str, max_len: usize) -> Result<&str, SubmitError> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(SubmitError::EmptyPrompt);
    }
    let len = prompt.chars().count();
    if len > max_len {
        return Err(SubmitError::PromptTooLong { len, max: max_len });
    }
    Ok(prompt)
}
