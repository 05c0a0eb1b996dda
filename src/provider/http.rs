use super::{Generation, GenerationRequest, ModelFamily, ModelProvider, ProviderError};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use keyring::Entry;
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://bedrock-runtime.us-east-1.amazonaws.com";
const KEYRING_SERVICE: &str = "prompt-tune";
const KEYRING_USER: &str = "bedrock";
const API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Explicit bearer token. When absent, the keyring and then
    /// `AWS_BEARER_TOKEN_BEDROCK` are consulted.
    pub api_key: Option<String>,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

/// Calls `POST {base_url}/model/{model_id}/invoke` with a family-specific body.
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(ProviderError::from)?;

        let api_key = config.api_key.or_else(Self::lookup_api_key);
        if api_key.is_none() {
            debug!("no provider credentials found; remote optimization will be skipped");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn lookup_api_key() -> Option<String> {
        // 1. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(key) = entry.get_password() {
                return Some(key);
            }
        }

        // 2. Try Environment Variable
        env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn invoke_url(&self, model_id: &str) -> String {
        format!("{}/model/{}/invoke", self.base_url, model_id)
    }
}

#[async_trait]
impl ModelProvider for HttpProvider {
    async fn generate(&self, request: &GenerationRequest) -> std::result::Result<Generation, ProviderError> {
        let family = ModelFamily::from_model_id(&request.model_id)?;
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials(self.name().to_string()))?;

        let body = family.request_body(&request.prompt, request.max_tokens, request.temperature);
        let url = self.invoke_url(&request.model_id);
        debug!(model_id = %request.model_id, "invoking model");

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        let envelope: Value = serde_json::from_str(&text)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let generated = family.extract_text(&envelope)?;
        if generated.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(Generation {
            text: generated,
            usage: envelope.get("usage").cloned(),
        })
    }

    fn name(&self) -> &'static str {
        "bedrock-http"
    }
}

/// Validate a base URL before handing it to the provider.
pub fn validate_base_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid provider base URL '{}'", raw),
            ErrorContext::new()
                .with_field_path("base_url")
                .with_details(e.to_string())
                .with_source("http_provider"),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::configuration_with_context(
            format!("unsupported URL scheme '{}'", other),
            ErrorContext::new()
                .with_field_path("base_url")
                .with_source("http_provider"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_validation() {
        assert!(validate_base_url(DEFAULT_BASE_URL).is_ok());
        assert!(validate_base_url("http://127.0.0.1:4010").is_ok());
        assert!(matches!(
            validate_base_url("not a url"),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn invoke_url_strips_trailing_slash() {
        let provider = HttpProvider::new(HttpProviderConfig {
            base_url: "http://localhost:4010/".into(),
            api_key: Some("k".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            provider.invoke_url("amazon.nova-lite-v1:0"),
            "http://localhost:4010/model/amazon.nova-lite-v1:0/invoke"
        );
        assert!(provider.has_credentials());
    }

    #[tokio::test]
    async fn unsupported_family_fails_before_io() {
        let provider = HttpProvider::new(HttpProviderConfig {
            // Nothing listens here; reaching the network would be a transport error.
            base_url: "http://127.0.0.1:9".into(),
            api_key: Some("k".into()),
            ..Default::default()
        })
        .unwrap();
        let err = provider
            .generate(&GenerationRequest {
                model_id: "mistral.large".into(),
                prompt: "p".into(),
                max_tokens: 10,
                temperature: 0.1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedModel(_)));
    }
}
