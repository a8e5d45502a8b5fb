use serde::{Deserialize, Serialize};
use settings::Settings;

/// Body encoding for the outbound request. The form variant posts to the
/// page URL with the full settings snapshot; the JSON variant posts only
/// the prompt to the generate endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Form,
    #[default]
    Json,
}

#[derive(Serialize)]
pub(crate) struct JsonPrompt<'a> {
    pub prompt: &'a str,
}

/// Form fields snapshotted from the settings at submit time. Field names
/// follow the backend's expectations, camelCase and all.
pub(crate) fn form_fields(prompt: &str, settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("prompt", prompt.to_string()),
        ("role", settings.role.clone()),
        ("temperature", settings.temperature.to_string()),
        ("maxTokens", settings.max_tokens.to_string()),
        ("topP", settings.top_p.to_string()),
        ("topK", settings.top_k.to_string()),
        ("model_path", settings.model_path.clone()),
    ]
}
