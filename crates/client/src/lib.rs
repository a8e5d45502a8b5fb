//! HTTP client for the textgen backend.
//!
//! One canonical wire contract, configurable on two axes: body encoding
//! (form fields to the page URL, or a JSON prompt to the generate endpoint)
//! and what to do after success (see [`flow`]). Redirects are never followed
//! automatically so a 3xx can be handled as its own outcome.

use log::{debug, info};
use reqwest::header::LOCATION;
use serde::Deserialize;
use settings::Settings;

mod csrf;
pub mod error;
pub mod flow;
pub mod payload;
pub mod retry;

pub use error::SubmitError;
pub use flow::{SubmitFlow, SubmitReport, SuccessPolicy};
pub use payload::Encoding;

const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_COOKIE: &str = "csrftoken";

/// Outcome of one successful round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx with a reply body; the text is the generated response.
    Replied(String),
    /// 3xx; the server wants the client to navigate to this URL.
    Redirected(String),
}

#[derive(Deserialize)]
struct GenerateReply {
    success: Option<bool>,
    response: Option<String>,
    error: Option<String>,
}

pub struct SubmitClient {
    http: reqwest::Client,
    page_url: String,
    generate_url: String,
    encoding: Encoding,
    csrf_token: Option<String>,
}

impl SubmitClient {
    pub fn new(base_url: &str, generate_path: &str, encoding: Encoding) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()?;
        let page_url = base_url.trim_end_matches('/').to_string();
        let generate_url = format!("{}/{}", page_url, generate_path.trim_start_matches('/'));
        Ok(Self {
            http,
            page_url,
            generate_url,
            encoding,
            csrf_token: None,
        })
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn set_csrf_token(&mut self, token: Option<String>) {
        self.csrf_token = token;
    }

    /// Fetches the page once and pulls the anti-forgery token from the
    /// hidden form field, falling back to the session cookie. Failure here
    /// is not fatal; the submit header is simply omitted.
    pub async fn discover_csrf(&mut self) -> Result<(), SubmitError> {
        let response = self.http.get(&self.page_url).send().await?;
        let cookie_token = response
            .cookies()
            .find(|c| c.name() == CSRF_COOKIE)
            .map(|c| c.value().to_string());
        let body = response.text().await?;
        self.csrf_token = csrf::extract_csrf_token(&body).or(cookie_token);
        match &self.csrf_token {
            Some(_) => info!("anti-forgery token discovered"),
            None => info!("no anti-forgery token on the page, submitting without one"),
        }
        Ok(())
    }

    /// Issues the single outbound request for one prompt, snapshotting the
    /// settings at call time, and dispatches on the result.
    pub async fn submit(&self, prompt: &str, settings: &Settings) -> Result<Outcome, SubmitError> {
        let request = match self.encoding {
            Encoding::Form => self
                .http
                .post(&self.page_url)
                .form(&payload::form_fields(prompt, settings)),
            Encoding::Json => self
                .http
                .post(&self.generate_url)
                .json(&payload::JsonPrompt { prompt }),
        };
        let request = match &self.csrf_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("submit returned {}", status);

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| SubmitError::Protocol("redirect without a Location".to_string()))?;
            return Ok(Outcome::Redirected(self.resolve_url(location)));
        }

        let body = response.text().await?;
        if !status.is_success() {
            let detail = match body.trim() {
                "" => status.canonical_reason().unwrap_or("no detail").to_string(),
                text => text.to_string(),
            };
            return Err(SubmitError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        parse_reply(&body)
    }

    /// [`submit`](Self::submit) with transport-level retry. HTTP error
    /// statuses and malformed bodies are never retried.
    pub async fn submit_with_retry(
        &self,
        prompt: &str,
        settings: &Settings,
        max_attempts: usize,
        delay: std::time::Duration,
    ) -> Result<Outcome, SubmitError> {
        retry::retry(
            async || self.submit(prompt, settings).await,
            max_attempts.max(1),
            delay,
            SubmitError::is_transport,
        )
        .await
    }

    /// GETs a URL and discards the body. Used when following a redirect or
    /// refetching the page under the reload policy.
    pub async fn fetch(&self, url: &str) -> Result<(), SubmitError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(SubmitError::Http {
                status: status.as_u16(),
                detail: status.canonical_reason().unwrap_or("no detail").to_string(),
            });
        }
        Ok(())
    }

    pub async fn fetch_page(&self) -> Result<(), SubmitError> {
        self.fetch(&self.page_url).await
    }

    fn resolve_url(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.page_url, location.trim_start_matches('/'))
        }
    }
}

fn parse_reply(body: &str) -> Result<Outcome, SubmitError> {
    let reply: GenerateReply = serde_json::from_str(body)
        .map_err(|e| SubmitError::Protocol(format!("malformed reply body: {}", e)))?;

    // `success` is absent in the bare `{response}` shape; treat it as true.
    if !reply.success.unwrap_or(true) {
        return Err(SubmitError::Protocol(
            reply.error.unwrap_or_else(|| "unknown error from server".to_string()),
        ));
    }
    match reply.response {
        Some(text) => Ok(Outcome::Replied(text)),
        None => Err(SubmitError::Protocol(
            reply.error.unwrap_or_else(|| "reply is missing the response text".to_string()),
        )),
    }
}

#[cfg(test)]
pub(crate) mod testutil;
