use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

impl Default for CredentialRef {
    fn default() -> Self {
        CredentialRef::Env {
            var: "CONCORD_BOT_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("missing credential environment variable {var}")]
    MissingEnv { var: String },
    #[error("inline credential token cannot be empty")]
    EmptyToken,
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the `Authorization` header value, if any.
    async fn resolve(&self, reference: &CredentialRef) -> Result<Option<String>, CredentialError>;
}

#[derive(Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, reference: &CredentialRef) -> Result<Option<String>, CredentialError> {
        match reference {
            CredentialRef::Env { var } => {
                let token = env::var(var)
                    .ok()
                    .filter(|token| !token.trim().is_empty())
                    .ok_or_else(|| CredentialError::MissingEnv { var: var.clone() })?;
                Ok(Some(bot_authorization(&token)))
            }
            CredentialRef::InlineToken { token } => {
                if token.trim().is_empty() {
                    return Err(CredentialError::EmptyToken);
                }
                Ok(Some(bot_authorization(token)))
            }
            CredentialRef::None => Ok(None),
        }
    }
}

fn bot_authorization(token: &str) -> String {
    format!("Bot {}", token.trim())
}
