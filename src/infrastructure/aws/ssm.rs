use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;

use crate::core::store::SecretStore;
use crate::errors::HandlerError;

/// Secrets held as `SecureString` parameters in SSM Parameter Store.
pub struct SsmSecretStore {
    client: SsmClient,
}

impl SsmSecretStore {
    #[must_use]
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    /// # Errors
    ///
    /// Returns `SecretAccess` if the parameter cannot be read or has no value.
    async fn get_secret(&self, name: &str) -> Result<String, HandlerError> {
        let resp = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                HandlerError::SecretAccess(format!(
                    "ssm get_parameter {name}: {}",
                    aws_sdk_ssm::error::DisplayErrorContext(&e)
                ))
            })?;

        resp.parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| HandlerError::SecretAccess(format!("parameter {name} has no value")))
    }
}
