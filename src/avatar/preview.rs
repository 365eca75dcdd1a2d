//! Before/after avatar preview
//!
//! Both avatars are requested at once, each under its own timeout. A failed
//! or slow avatar is replaced by the matching body template; the preview
//! itself never fails.

use super::{AvatarError, AvatarGenerator, AvatarKind, AvatarRequest};
use crate::transformation::{select_templates, BodyTemplate, TransformationInput};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

pub const GENERATED_DISCLAIMER: &str =
    "This is a realistic visual projection based on profiles similar to yours.";

pub const FALLBACK_DISCLAIMER: &str =
    "Illustrative body templates are shown while your personalized avatar is unavailable.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AvatarImage {
    Generated { url: String },
    Placeholder { template: BodyTemplate },
}

impl AvatarImage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, AvatarImage::Placeholder { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarPreview {
    pub current: AvatarImage,
    pub goal: AvatarImage,
    /// Displayed loss, never negative
    pub weight_diff: f64,
    pub disclaimer: &'static str,
}

impl AvatarPreview {
    pub fn used_fallback(&self) -> bool {
        self.current.is_placeholder() || self.goal.is_placeholder()
    }
}

/// Request both avatars concurrently.
///
/// `request` supplies the figures; its `kind` is ignored. No retries: a
/// manual retry calls this again.
pub async fn generate_preview<G>(generator: &G, request: &AvatarRequest, timeout: Duration) -> AvatarPreview
where
    G: AvatarGenerator + ?Sized,
{
    let current_request = request.with_kind(AvatarKind::Current);
    let goal_request = request.with_kind(AvatarKind::Goal);

    let (current, goal) = tokio::join!(
        generate_bounded(generator, &current_request, timeout),
        generate_bounded(generator, &goal_request, timeout),
    );

    let templates = select_templates(&TransformationInput {
        gender: Some(request.gender.clone()),
        height: request.height,
        current_weight: Some(request.current_weight),
        goal_weight: Some(request.goal_weight),
    });

    let current = resolve(current, templates.before, AvatarKind::Current);
    let goal = resolve(goal, templates.after, AvatarKind::Goal);
    let disclaimer = if current.is_placeholder() || goal.is_placeholder() {
        FALLBACK_DISCLAIMER
    } else {
        GENERATED_DISCLAIMER
    };

    AvatarPreview {
        current,
        goal,
        weight_diff: templates.weight_diff,
        disclaimer,
    }
}

async fn generate_bounded<G>(
    generator: &G,
    request: &AvatarRequest,
    timeout: Duration,
) -> Result<String, AvatarError>
where
    G: AvatarGenerator + ?Sized,
{
    match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(result) => result,
        Err(_) => Err(AvatarError::Timeout(timeout)),
    }
}

fn resolve(result: Result<String, AvatarError>, template: BodyTemplate, kind: AvatarKind) -> AvatarImage {
    match result {
        Ok(url) => AvatarImage::Generated { url },
        Err(e) => {
            warn!(?kind, error = %e, template = %template.asset_name(), "avatar unavailable, using template");
            AvatarImage::Placeholder { template }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::MockAvatarGenerator;
    use crate::transformation::{BodyShape, BodyType};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn request() -> AvatarRequest {
        AvatarRequest {
            gender: "female".to_string(),
            current_weight: 85.0,
            goal_weight: 75.0,
            height: Some(170.0),
            age_range: None,
            kind: AvatarKind::Current,
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl AvatarGenerator for SlowGenerator {
        async fn generate(&self, _request: &AvatarRequest) -> Result<String, AvatarError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok("https://img.example.com/late.png".to_string())
        }
    }

    #[tokio::test]
    async fn test_both_avatars_generated() {
        let mut mock = MockAvatarGenerator::new();
        mock.expect_generate()
            .withf(|r: &AvatarRequest| r.kind == AvatarKind::Current)
            .times(1)
            .returning(|_| Ok("https://img.example.com/current.png".to_string()));
        mock.expect_generate()
            .withf(|r: &AvatarRequest| r.kind == AvatarKind::Goal)
            .times(1)
            .returning(|_| Ok("https://img.example.com/goal.png".to_string()));

        let preview = generate_preview(&mock, &request(), Duration::from_millis(2_500)).await;

        assert_eq!(
            preview.current,
            AvatarImage::Generated {
                url: "https://img.example.com/current.png".to_string()
            }
        );
        assert!(!preview.used_fallback());
        assert_eq!(preview.disclaimer, GENERATED_DISCLAIMER);
        assert_eq!(preview.weight_diff, 10.0);
    }

    #[tokio::test]
    async fn test_single_failure_degrades_one_avatar() {
        let mut mock = MockAvatarGenerator::new();
        mock.expect_generate()
            .withf(|r: &AvatarRequest| r.kind == AvatarKind::Current)
            .returning(|_| Ok("https://img.example.com/current.png".to_string()));
        mock.expect_generate()
            .withf(|r: &AvatarRequest| r.kind == AvatarKind::Goal)
            .returning(|_| Err(AvatarError::RateLimited));

        let preview = generate_preview(&mock, &request(), Duration::from_millis(2_500)).await;

        assert!(!preview.current.is_placeholder());
        assert_eq!(
            preview.goal,
            AvatarImage::Placeholder {
                template: BodyTemplate {
                    body: BodyType::Female,
                    shape: BodyShape::Average,
                }
            }
        );
        assert_eq!(preview.disclaimer, FALLBACK_DISCLAIMER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_templates() {
        let preview = generate_preview(&SlowGenerator, &request(), Duration::from_millis(2_500)).await;

        assert!(preview.current.is_placeholder());
        assert!(preview.goal.is_placeholder());
        assert_eq!(preview.disclaimer, FALLBACK_DISCLAIMER);
    }

    #[tokio::test]
    async fn test_empty_image_counts_as_failure() {
        let mut mock = MockAvatarGenerator::new();
        mock.expect_generate()
            .times(2)
            .returning(|_| Err(AvatarError::MissingImage));

        let preview = generate_preview(&mock, &request(), Duration::from_millis(2_500)).await;
        assert!(preview.used_fallback());
    }
}
