//! Core types for the SlimVita funnel
//!
//! This module defines the closed vocabularies the questionnaire answers are
//! parsed into, the frozen `UserProfile` handed to the calculator, and the
//! `HealthResults` record it produces.

use crate::error::FunnelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Gender as answered in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Other => "other",
        }
    }

    /// The BMR formulas are binary: only `Male` selects the male equation.
    pub fn uses_male_formula(&self) -> bool {
        matches!(self, Gender::Male)
    }
}

impl FromStr for Gender {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            "other" => Ok(Gender::Other),
            _ => Err(invalid("gender", s)),
        }
    }
}

/// Age bucket offered by the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55-64")]
    From55To64,
    #[serde(rename = "65+")]
    Over65,
}

/// Age used when no bucket was answered
pub const DEFAULT_AGE_YEARS: f64 = 30.0;

impl AgeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::From18To24 => "18-24",
            AgeRange::From25To34 => "25-34",
            AgeRange::From35To44 => "35-44",
            AgeRange::From45To54 => "45-54",
            AgeRange::From55To64 => "55-64",
            AgeRange::Over65 => "65+",
        }
    }

    /// Representative age for the bucket
    pub fn representative_age(&self) -> f64 {
        match self {
            AgeRange::From18To24 => 21.0,
            AgeRange::From25To34 => 30.0,
            AgeRange::From35To44 => 40.0,
            AgeRange::From45To54 => 50.0,
            AgeRange::From55To64 => 60.0,
            AgeRange::Over65 => 70.0,
        }
    }
}

impl FromStr for AgeRange {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "18-24" => Ok(AgeRange::From18To24),
            "25-34" => Ok(AgeRange::From25To34),
            "35-44" => Ok(AgeRange::From35To44),
            "45-54" => Ok(AgeRange::From45To54),
            "55-64" => Ok(AgeRange::From55To64),
            "65+" => Ok(AgeRange::Over65),
            _ => Err(invalid("age", s)),
        }
    }
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
        }
    }

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
        }
    }

    /// Lifestyle wording used in the TDEE message
    pub fn lifestyle(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "lightly active",
            ActivityLevel::Moderate => "moderately active",
            ActivityLevel::Active => "very active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            _ => Err(invalid("activityLevel", s)),
        }
    }
}

/// Main goal selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    LoseWeight,
    GetFit,
    Energy,
    Health,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::LoseWeight => "lose-weight",
            Goal::GetFit => "get-fit",
            Goal::Energy => "energy",
            Goal::Health => "health",
        }
    }

    /// Phrase completing "optimized specifically for your metabolism, activity level, and ..."
    pub fn plan_focus(&self) -> &'static str {
        match self {
            Goal::LoseWeight => "weight-loss potential",
            Goal::GetFit => "fitness goals",
            Goal::Energy => "energy optimization",
            Goal::Health => "health improvement",
        }
    }
}

impl FromStr for Goal {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lose-weight" => Ok(Goal::LoseWeight),
            "get-fit" => Ok(Goal::GetFit),
            "energy" => Ok(Goal::Energy),
            "health" => Ok(Goal::Health),
            _ => Err(invalid("goal", s)),
        }
    }
}

/// BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    #[serde(rename = "underweight")]
    Underweight,
    #[serde(rename = "normal weight")]
    NormalWeight,
    #[serde(rename = "overweight")]
    Overweight,
    #[serde(rename = "obese")]
    Obese,
}

impl BmiCategory {
    /// Classify a BMI value. Each threshold belongs to the category above it.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::NormalWeight => "normal weight",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frozen questionnaire answers, as consumed by the calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Gender,
    /// Age bucket; `None` resolves to `DEFAULT_AGE_YEARS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
    /// Height in centimeters
    pub height: f64,
    /// Current weight in kilograms
    pub current_weight: f64,
    /// Target weight in kilograms (may exceed current weight)
    pub target_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Answers that do not feed the calculator (timeline, challenges, diet, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UserProfile {
    /// Age used by the BMR formula
    pub fn age_years(&self) -> f64 {
        self.age_range
            .map(|range| range.representative_age())
            .unwrap_or(DEFAULT_AGE_YEARS)
    }
}

/// Output of the health metrics calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResults {
    /// Unrounded BMI
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmi_message: String,
    /// Basal metabolic rate (kcal/day, rounded)
    pub bmr: i64,
    pub bmr_message: String,
    /// Total daily energy expenditure (kcal/day, rounded)
    pub tdee: i64,
    pub tdee_message: String,
    /// Recommended daily intake (kcal/day, rounded)
    pub calorie_target: i64,
    pub calorie_message: String,
    /// `current_weight - target_weight`, negative when the target is heavier
    pub weight_to_lose: f64,
    pub estimated_weeks: u32,
    pub personal_plan_message: String,
}

impl HealthResults {
    /// BMI as shown everywhere it is displayed (one decimal)
    pub fn bmi_display(&self) -> String {
        format_bmi(self.bmi)
    }

    /// Weight to lose as presented to the user, never negative
    pub fn weight_loss_kg(&self) -> f64 {
        self.weight_to_lose.max(0.0)
    }
}

/// One-decimal BMI formatting shared by messages and views
pub fn format_bmi(bmi: f64) -> String {
    format_one_decimal(bmi)
}

/// One decimal place with ties rounded away from zero (`24.25` → `24.3`).
/// Plain `{:.1}` rounds exact ties to even.
pub fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

fn invalid(field: &str, value: &str) -> FunnelError {
    FunnelError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_decimal_rounds_ties_up() {
        assert_eq!(format_one_decimal(24.25), "24.3");
        assert_eq!(format_one_decimal(25.25), "25.3");
        assert_eq!(format_one_decimal(24.24), "24.2");
        assert_eq!(format_one_decimal(5.0), "5.0");
        assert_eq!(format_bmi(97.0 / (2.0 * 2.0)), "24.3");
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(BmiCategory::from_bmi(18.499), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(24.999), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.999), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_age_range_midpoints() {
        let ages: Vec<f64> = ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"]
            .iter()
            .map(|s| s.parse::<AgeRange>().unwrap().representative_age())
            .collect();
        assert_eq!(ages, vec![21.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
    }

    #[test]
    fn test_enum_serde_uses_questionnaire_values() {
        assert_eq!(serde_json::to_string(&Goal::LoseWeight).unwrap(), "\"lose-weight\"");
        assert_eq!(
            serde_json::to_string(&BmiCategory::NormalWeight).unwrap(),
            "\"normal weight\""
        );
        let age: AgeRange = serde_json::from_str("\"65+\"").unwrap();
        assert_eq!(age, AgeRange::Over65);
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert!("walk-more".parse::<Goal>().is_err());
        assert!("extreme".parse::<ActivityLevel>().is_err());
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn test_only_male_uses_male_formula() {
        assert!(Gender::Male.uses_male_formula());
        assert!(!Gender::Female.uses_male_formula());
        assert!(!Gender::Other.uses_male_formula());
    }
}
