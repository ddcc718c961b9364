use crate::db::config_store::{ConfigStore, RECAPTCHA_SECRET_KEY, RECAPTCHA_SITE_KEY};
use crate::error::CoopError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;

/// Form field the reCAPTCHA widget posts its token in.
pub const RECAPTCHA_RESPONSE_FIELD: &str = "g-recaptcha-response";

/// Site/secret key pair, as stored in the config table or read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecaptchaKeys {
    pub site_key: String,
    pub secret_key: String,
}

impl RecaptchaKeys {
    pub fn from_file(path: &Path) -> Result<Self, CoopError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Both keys must be present; a half-configured pair counts as disabled.
    pub async fn load(store: &ConfigStore) -> Result<Option<Self>, CoopError> {
        let site = store.get(RECAPTCHA_SITE_KEY).await?;
        let secret = store.get(RECAPTCHA_SECRET_KEY).await?;
        Ok(match (site, secret) {
            (Some(site_key), Some(secret_key)) => Some(Self {
                site_key,
                secret_key,
            }),
            (None, None) => None,
            _ => {
                warn!("only one reCAPTCHA key is configured; CAPTCHA disabled");
                None
            }
        })
    }

    pub async fn save(&self, store: &ConfigStore) -> Result<(), CoopError> {
        store.set(RECAPTCHA_SITE_KEY, &self.site_key).await?;
        store.set(RECAPTCHA_SECRET_KEY, &self.secret_key).await?;
        info!("stored reCAPTCHA keys");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Checks widget tokens against the reCAPTCHA `siteverify` endpoint.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    keys: RecaptchaKeys,
    verify_url: Url,
}

impl RecaptchaVerifier {
    pub fn new(client: reqwest::Client, keys: RecaptchaKeys, verify_url: Url) -> Self {
        Self {
            client,
            keys,
            verify_url,
        }
    }

    pub fn site_key(&self) -> &str {
        &self.keys.site_key
    }

    /// `Ok(false)` when the token is absent or Google rejects it.
    pub async fn verify(&self, response_token: Option<&str>) -> Result<bool, CoopError> {
        let Some(token) = response_token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        let resp: SiteVerifyResponse = self
            .client
            .post(self.verify_url.clone())
            .form(&[("secret", self.keys.secret_key.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !resp.success {
            debug!(error_codes = ?resp.error_codes, "reCAPTCHA rejected token");
        }
        Ok(resp.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::memory_pool;

    #[tokio::test]
    async fn keys_round_trip_through_config_store() {
        let store = ConfigStore::new(memory_pool().await);
        assert_eq!(RecaptchaKeys::load(&store).await.unwrap(), None);

        let keys = RecaptchaKeys {
            site_key: "site".to_string(),
            secret_key: "secret".to_string(),
        };
        keys.save(&store).await.unwrap();
        assert_eq!(RecaptchaKeys::load(&store).await.unwrap(), Some(keys));
    }

    #[tokio::test]
    async fn half_configured_keys_disable_captcha() {
        let store = ConfigStore::new(memory_pool().await);
        store.set(RECAPTCHA_SITE_KEY, "site").await.unwrap();
        assert_eq!(RecaptchaKeys::load(&store).await.unwrap(), None);
    }

    #[test]
    fn keys_parse_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recaptcha.json");
        std::fs::write(&path, r#"{"site_key":"s","secret_key":"k"}"#).unwrap();
        let keys = RecaptchaKeys::from_file(&path).unwrap();
        assert_eq!(keys.site_key, "s");
        assert_eq!(keys.secret_key, "k");
    }

    #[tokio::test]
    async fn blank_token_is_rejected_without_a_request() {
        let verifier = RecaptchaVerifier::new(
            reqwest::Client::new(),
            RecaptchaKeys {
                site_key: "s".to_string(),
                secret_key: "k".to_string(),
            },
            Url::parse("http://127.0.0.1:9/unreachable").unwrap(),
        );
        assert!(!verifier.verify(None).await.unwrap());
        assert!(!verifier.verify(Some("   ")).await.unwrap());
    }
}
