use client::{Encoding, SuccessPolicy};
use serde::{Deserialize, Serialize};

/// Static client configuration, stored next to the settings file. Every
/// field here is wired to real behavior; the retry knobs feed the
/// transport-retry loop in the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Base URL of the chat page.
    pub base_url: String,
    /// Path of the JSON generate endpoint, relative to `base_url`.
    pub generate_path: String,
    pub encoding: Encoding,
    pub success_policy: SuccessPolicy,
    pub max_prompt_len: usize,
    /// Total attempts per submit; only transport failures use more than one.
    pub max_attempts: usize,
    pub retry_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            generate_path: "generate/".to_string(),
            encoding: Encoding::Json,
            success_policy: SuccessPolicy::InPlace,
            max_prompt_len: 2000,
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_documented_ones() {
        let config = AppConfig::default();
        assert_eq!(config.max_prompt_len, 2000);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.success_policy, SuccessPolicy::InPlace);
    }

    #[test]
    fn config_file_round_trips_by_field_name() {
        let raw = serde_json::to_string(&AppConfig::default()).unwrap();
        assert!(raw.contains("\"max_attempts\""));
        let parsed: AppConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.max_attempts, 3);
    }
}
