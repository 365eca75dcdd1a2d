//! SlimVita Funnel - questionnaire, health metrics and plan hand-off engine
//!
//! Owns the non-presentational logic of the SlimVita onboarding funnel:
//! questionnaire answers → frozen profile → health metrics → session
//! hand-off → plans and checkout.
//!
//! ## Modules
//!
//! - **Questionnaire**: step definitions, answer map and the step state machine
//! - **Calculator**: BMI, BMR, TDEE, calorie target and timeline
//! - **Hand-off**: session store shared between the questionnaire and the plans page
//! - **Plans**: pricing tiers and the checkout redirect
//! - **Avatar**: before/after avatar generation with template fallback

pub mod avatar;
pub mod calculator;
pub mod config;
pub mod error;
pub mod funnel;
pub mod handoff;
pub mod plans;
pub mod questionnaire;
pub mod results;
pub mod transformation;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calculator::{calculate_health_metrics, HarrisBenedict, MetricsCalculator};
pub use config::FunnelConfig;
pub use error::FunnelError;
pub use funnel::{Funnel, Stage};
pub use handoff::{HandoffRecord, SessionStore};
pub use plans::{CheckoutRedirect, PlanTier, PlansPage};
pub use questionnaire::{AnswerEvent, QuestionnaireController};
pub use results::ResultsView;
pub use types::{HealthResults, UserProfile};

// Avatar exports
pub use avatar::{generate_preview, AvatarGenerator, AvatarPreview, HttpAvatarClient};

/// Library version
pub const FUNNEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name reported by the CLI
pub const PRODUCT_NAME: &str = "slimvita-funnel";
