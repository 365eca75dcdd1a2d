//! Plans page and checkout hand-off
//!
//! The page reads the questionnaire hand-off once, falling back to a default
//! profile when the visitor arrived without completing the questionnaire.

use crate::calculator::calculate_bmi;
use crate::config::CheckoutConfig;
use crate::error::FunnelError;
use crate::handoff::{HandoffRecord, SessionStore};
use crate::types::{BmiCategory, Gender};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Height assumed by the checkout summary when no BMI was handed off
pub const FALLBACK_HEIGHT_M: f64 = 1.65;

/// Number of staged analysis messages shown before redirecting
pub const CHECKOUT_ANALYSIS_STEPS: u32 = 5;
pub const CHECKOUT_STEP_DURATION: Duration = Duration::from_millis(600);
pub const CHECKOUT_REDIRECT_DELAY: Duration = Duration::from_secs(4);

/// Minimum projected duration quoted on the checkout screen
pub const MIN_PROJECTED_WEEKS: u32 = 4;

const DEFAULT_GENDER: Gender = Gender::Female;
const DEFAULT_CURRENT_WEIGHT_KG: f64 = 85.0;
const DEFAULT_TARGET_WEIGHT_KG: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
    Premium,
}

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Basic, PlanTier::Pro, PlanTier::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "basic",
            PlanTier::Pro => "pro",
            PlanTier::Premium => "premium",
        }
    }

    pub fn checkout_url<'a>(&self, config: &'a CheckoutConfig) -> &'a str {
        match self {
            PlanTier::Basic => &config.basic_url,
            PlanTier::Pro => &config.pro_url,
            PlanTier::Premium => &config.premium_url,
        }
    }
}

impl FromStr for PlanTier {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(PlanTier::Basic),
            "pro" => Ok(PlanTier::Pro),
            "premium" => Ok(PlanTier::Premium),
            _ => Err(FunnelError::UnknownPlan(s.to_string())),
        }
    }
}

/// A priced plan as listed on the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub tier: PlanTier,
    pub name: &'static str,
    /// Monthly price in whole currency units
    pub price: u32,
    pub period: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub highlighted: bool,
    pub cta: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
    pub checkout_url: String,
}

fn catalog(config: &CheckoutConfig) -> Vec<Plan> {
    vec![
        Plan {
            tier: PlanTier::Basic,
            name: "Basic",
            price: 29,
            period: "month",
            description: "Perfect to start your transformation journey.",
            features: &[
                "Personalized weekly walking plan",
                "Simple progress reports",
                "SlimVita app access",
                "Exercise library",
                "Support community",
            ],
            highlighted: false,
            cta: "Choose Basic",
            badge: None,
            checkout_url: PlanTier::Basic.checkout_url(config).to_string(),
        },
        Plan {
            tier: PlanTier::Pro,
            name: "Pro",
            price: 59,
            period: "month",
            description: "The most popular plan for consistent results.",
            features: &[
                "Personalized daily walking plan",
                "Personalized nutrition",
                "Specialist follow-up",
                "Full dashboard",
                "Advanced reports",
                "Weekly challenges",
                "Priority support",
            ],
            highlighted: true,
            cta: "Choose Pro",
            badge: Some("Most Popular"),
            checkout_url: PlanTier::Pro.checkout_url(config).to_string(),
        },
        Plan {
            tier: PlanTier::Premium,
            name: "Premium",
            price: 89,
            period: "month",
            description: "The complete experience with exclusive coaching.",
            features: &[
                "Everything in Pro",
                "Exclusive 1:1 coaching",
                "Monthly live check-in",
                "Detailed nutrition plan",
                "Weekly plan adjustments",
                "Early access to new features",
                "Dedicated 24/7 support",
            ],
            highlighted: false,
            cta: "Choose Premium",
            badge: None,
            checkout_url: PlanTier::Premium.checkout_url(config).to_string(),
        },
    ]
}

/// Where the page's profile came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ProfileSource {
    Handoff(Box<HandoffRecord>),
    Default,
}

/// Profile subset shown on the plans page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlansProfile {
    pub gender: Gender,
    pub current_weight: f64,
    pub target_weight: f64,
    pub source: ProfileSource,
}

impl PlansProfile {
    fn from_handoff(record: HandoffRecord) -> Self {
        Self {
            gender: record.gender,
            current_weight: record.current_weight,
            target_weight: record.target_weight,
            source: ProfileSource::Handoff(Box::new(record)),
        }
    }

    fn fallback() -> Self {
        Self {
            gender: DEFAULT_GENDER,
            current_weight: DEFAULT_CURRENT_WEIGHT_KG,
            target_weight: DEFAULT_TARGET_WEIGHT_KG,
            source: ProfileSource::Default,
        }
    }

    pub fn handoff(&self) -> Option<&HandoffRecord> {
        match &self.source {
            ProfileSource::Handoff(record) => Some(record),
            ProfileSource::Default => None,
        }
    }

    /// Signed difference; may be negative
    pub fn weight_delta(&self) -> f64 {
        self.current_weight - self.target_weight
    }
}

/// Figures quoted on the checkout loading screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSummary {
    pub plan: PlanTier,
    pub bmi: f64,
    pub bmi_category: String,
    pub current_weight: f64,
    pub target_weight: f64,
    pub projected_weeks: u32,
}

/// Terminal checkout step: where to go and how long the hand-off takes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRedirect {
    pub url: String,
    pub finalize_after: Duration,
    pub summary: CheckoutSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlansPage {
    pub profile: PlansProfile,
    pub plans: Vec<Plan>,
}

impl PlansPage {
    /// Read the hand-off once and build the page
    pub fn from_session(store: &SessionStore, config: &CheckoutConfig) -> Self {
        let profile = match store.load_handoff() {
            Some(record) => PlansProfile::from_handoff(record),
            None => {
                debug!("no questionnaire hand-off, using default profile");
                PlansProfile::fallback()
            }
        };

        Self {
            profile,
            plans: catalog(config),
        }
    }

    /// Weight to lose as displayed, never negative
    pub fn weight_to_lose(&self) -> f64 {
        self.profile.weight_delta().max(0.0)
    }

    /// Duration quoted on the checkout screen
    pub fn projected_weeks(&self) -> u32 {
        (self.profile.weight_delta() * 2.0)
            .round()
            .max(MIN_PROJECTED_WEEKS as f64) as u32
    }

    pub fn plan(&self, tier: PlanTier) -> Option<&Plan> {
        self.plans.iter().find(|p| p.tier == tier)
    }

    pub fn checkout(&self, tier: PlanTier) -> Result<CheckoutRedirect, FunnelError> {
        let plan = self
            .plan(tier)
            .ok_or_else(|| FunnelError::UnknownPlan(tier.as_str().to_string()))?;

        let (bmi, bmi_category) = match self.profile.handoff() {
            Some(record) => (
                record.results.bmi,
                record.results.bmi_category.as_str().to_string(),
            ),
            None => {
                let bmi = calculate_bmi(self.profile.current_weight, FALLBACK_HEIGHT_M * 100.0);
                (bmi, fallback_category(bmi).to_string())
            }
        };

        info!(plan = tier.as_str(), url = %plan.checkout_url, "redirecting to checkout");

        Ok(CheckoutRedirect {
            url: plan.checkout_url.clone(),
            finalize_after: finalize_duration(),
            summary: CheckoutSummary {
                plan: tier,
                bmi,
                bmi_category,
                current_weight: self.profile.current_weight,
                target_weight: self.profile.target_weight,
                projected_weeks: self.projected_weeks(),
            },
        })
    }
}

/// Staged analysis plus the final redirect delay
pub fn finalize_duration() -> Duration {
    CHECKOUT_STEP_DURATION * CHECKOUT_ANALYSIS_STEPS + CHECKOUT_REDIRECT_DELAY
}

// coarser than BmiCategory: only two buckets without a hand-off
fn fallback_category(bmi: f64) -> &'static str {
    if bmi >= 25.0 {
        BmiCategory::Overweight.as_str()
    } else {
        "normal"
    }
}
