//! Body avatar generation
//!
//! The generation endpoint is an opaque collaborator: it takes the visitor's
//! figures and returns an image URL, or fails. The preview asks for the
//! current and the goal avatar concurrently and degrades each one to a
//! bundled template on failure.

pub mod client;
pub mod preview;

use crate::types::{AgeRange, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use client::HttpAvatarClient;
pub use preview::{generate_preview, AvatarImage, AvatarPreview, FALLBACK_DISCLAIMER, GENERATED_DISCLAIMER};

/// Which of the two avatars is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    Current,
    Goal,
}

/// Request body sent to the endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    pub gender: String,
    pub current_weight: f64,
    pub goal_weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
    #[serde(rename = "type")]
    pub kind: AvatarKind,
}

impl AvatarRequest {
    pub fn from_profile(profile: &UserProfile, kind: AvatarKind) -> Self {
        Self {
            gender: profile.gender.as_str().to_string(),
            current_weight: profile.current_weight,
            goal_weight: profile.target_weight,
            height: Some(profile.height),
            age_range: profile.age_range,
            kind,
        }
    }

    /// Same figures, other avatar
    pub fn with_kind(&self, kind: AvatarKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Successful response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarError {
    #[error("Rate limits exceeded, please try again later")]
    RateLimited,

    #[error("Payment required")]
    PaymentRequired,

    #[error("Avatar service returned status {0}")]
    Failed(u16),

    #[error("Avatar service unreachable: {0}")]
    Transport(String),

    #[error("No image was generated")]
    MissingImage,

    #[error("Avatar request timed out after {0:?}")]
    Timeout(Duration),
}

impl AvatarError {
    /// Map a non-success HTTP status to its error
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => AvatarError::RateLimited,
            402 => AvatarError::PaymentRequired,
            other => AvatarError::Failed(other),
        }
    }
}

/// Produces one avatar image URL per request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarGenerator: Send + Sync {
    async fn generate(&self, request: &AvatarRequest) -> Result<String, AvatarError>;
}
