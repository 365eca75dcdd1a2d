//! HTTP avatar client

use super::{AvatarError, AvatarGenerator, AvatarRequest, AvatarResponse};
use crate::config::AvatarConfig;
use async_trait::async_trait;
use tracing::debug;

pub struct HttpAvatarClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpAvatarClient {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AvatarGenerator for HttpAvatarClient {
    async fn generate(&self, request: &AvatarRequest) -> Result<String, AvatarError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AvatarError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::from_status(status.as_u16()));
        }

        let body: AvatarResponse = response
            .json()
            .await
            .map_err(|_| AvatarError::MissingImage)?;

        debug!(kind = ?request.kind, "avatar generated");
        body.image_url
            .filter(|url| !url.is_empty())
            .ok_or(AvatarError::MissingImage)
    }
}
