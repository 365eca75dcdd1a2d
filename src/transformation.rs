//! Before/after body template selection
//!
//! A display heuristic for the avatar preview. Its thresholds are not the BMI
//! category boundaries and must not be unified with them.

use crate::calculator::calculate_bmi;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_CURRENT_WEIGHT_KG: f64 = 85.0;
pub const DEFAULT_GOAL_WEIGHT_KG: f64 = 75.0;

const BEFORE_OVERWEIGHT_BMI: f64 = 25.0;
const AFTER_HEAVY_START_BMI: f64 = 27.0;
const AFTER_FIT_GOAL_BMI: f64 = 22.0;

/// Binary body type used by the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Female,
    Male,
}

impl BodyType {
    /// Free-form gender text to a template body type
    pub fn from_gender_text(gender: &str) -> Self {
        let g = gender.to_lowercase();
        if g.contains("fem") || g.contains("woman") {
            BodyType::Female
        } else {
            BodyType::Male
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyShape {
    Fit,
    Average,
    Overweight,
}

/// One bundled template image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyTemplate {
    pub body: BodyType,
    pub shape: BodyShape,
}

impl BodyTemplate {
    /// Asset name, e.g. `female-overweight`
    pub fn asset_name(&self) -> String {
        let body = match self.body {
            BodyType::Female => "female",
            BodyType::Male => "male",
        };
        let shape = match self.shape {
            BodyShape::Fit => "fit",
            BodyShape::Average => "average",
            BodyShape::Overweight => "overweight",
        };
        format!("{body}-{shape}")
    }
}

/// Inputs for the preview; missing or non-positive values take the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformationInput {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub goal_weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub before: BodyTemplate,
    pub after: BodyTemplate,
    pub current_weight: f64,
    pub goal_weight: f64,
    pub current_bmi: f64,
    pub goal_bmi: f64,
    /// Displayed loss, never negative
    pub weight_diff: f64,
}

pub fn select_templates(input: &TransformationInput) -> Transformation {
    let body = BodyType::from_gender_text(input.gender.as_deref().unwrap_or_default());
    let height = positive_or(input.height, DEFAULT_HEIGHT_CM);
    let current_weight = positive_or(input.current_weight, DEFAULT_CURRENT_WEIGHT_KG);
    let goal_weight = positive_or(input.goal_weight, DEFAULT_GOAL_WEIGHT_KG);

    let current_bmi = calculate_bmi(current_weight, height);
    let goal_bmi = calculate_bmi(goal_weight, height);

    Transformation {
        before: BodyTemplate {
            body,
            shape: before_shape(current_bmi),
        },
        after: BodyTemplate {
            body,
            shape: after_shape(current_bmi, goal_bmi),
        },
        current_weight,
        goal_weight,
        current_bmi,
        goal_bmi,
        weight_diff: (current_weight - goal_weight).max(0.0),
    }
}

fn before_shape(current_bmi: f64) -> BodyShape {
    if current_bmi >= BEFORE_OVERWEIGHT_BMI {
        BodyShape::Overweight
    } else {
        BodyShape::Average
    }
}

// the after image is always slimmer than the before image
fn after_shape(current_bmi: f64, goal_bmi: f64) -> BodyShape {
    if current_bmi >= AFTER_HEAVY_START_BMI && goal_bmi >= AFTER_FIT_GOAL_BMI {
        BodyShape::Average
    } else {
        BodyShape::Fit
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(gender: &str, height: f64, current: f64, goal: f64) -> TransformationInput {
        TransformationInput {
            gender: Some(gender.to_string()),
            height: Some(height),
            current_weight: Some(current),
            goal_weight: Some(goal),
        }
    }

    #[test]
    fn test_gender_normalization() {
        assert_eq!(BodyType::from_gender_text("Female"), BodyType::Female);
        assert_eq!(BodyType::from_gender_text("woman"), BodyType::Female);
        assert_eq!(BodyType::from_gender_text("male"), BodyType::Male);
        assert_eq!(BodyType::from_gender_text("other"), BodyType::Male);
        assert_eq!(BodyType::from_gender_text(""), BodyType::Male);
    }

    #[test]
    fn test_defaults_apply() {
        let t = select_templates(&TransformationInput::default());

        assert_eq!(t.current_weight, 85.0);
        assert_eq!(t.goal_weight, 75.0);
        assert_eq!(t.weight_diff, 10.0);
        // 85 kg at 170 cm is BMI 29.4
        assert_eq!(t.before.asset_name(), "male-overweight");
        // goal BMI 26 keeps the heavy start on the average template
        assert_eq!(t.after.asset_name(), "male-average");
    }

    #[test]
    fn test_heavy_start_with_lean_goal_is_fit() {
        let t = select_templates(&input("female", 170.0, 90.0, 60.0));
        assert_eq!(t.before.shape, BodyShape::Overweight);
        assert_eq!(t.after.shape, BodyShape::Fit);
    }

    #[test]
    fn test_moderate_start_is_always_fit_after() {
        // BMI 25.95: overweight before, but under the heavy-start threshold
        let t = select_templates(&input("female", 170.0, 75.0, 74.0));
        assert_eq!(t.before.shape, BodyShape::Overweight);
        assert_eq!(t.after.shape, BodyShape::Fit);

        let lean = select_templates(&input("male", 180.0, 70.0, 68.0));
        assert_eq!(lean.before.shape, BodyShape::Average);
        assert_eq!(lean.after.shape, BodyShape::Fit);
    }

    #[test]
    fn test_weight_gain_shows_zero_diff() {
        let t = select_templates(&input("male", 180.0, 60.0, 70.0));
        assert_eq!(t.weight_diff, 0.0);
    }
}
