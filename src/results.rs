//! Results screen model
//!
//! Display-ready cards built from `HealthResults`. Values are formatted from
//! the rounded integers and the one-decimal BMI string the messages already
//! embed, so card and message always agree.

use crate::calculator::group_thousands;
use crate::types::{format_one_decimal, HealthResults};
use serde::Serialize;

const KCAL_PER_DAY: &str = "kcal/day";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub unit: String,
    pub message: String,
}

/// "Lose X kg in ~N weeks" line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightProjection {
    pub kilograms: String,
    pub weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub cards: Vec<MetricCard>,
    pub personal_plan: String,
    /// Only present when there is weight to lose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<WeightProjection>,
}

impl ResultsView {
    pub fn new(results: &HealthResults) -> Self {
        let cards = vec![
            MetricCard {
                title: "Body Mass Index (BMI)",
                value: results.bmi_display(),
                unit: format!("• {}", results.bmi_category),
                message: results.bmi_message.clone(),
            },
            kcal_card(
                "Basal Metabolic Rate (BMR)",
                results.bmr,
                &results.bmr_message,
            ),
            kcal_card(
                "Total Daily Energy Expenditure",
                results.tdee,
                &results.tdee_message,
            ),
            kcal_card(
                "Recommended Daily Intake",
                results.calorie_target,
                &results.calorie_message,
            ),
        ];

        let projection = (results.weight_loss_kg() > 0.0).then(|| WeightProjection {
            kilograms: format_one_decimal(results.weight_loss_kg()),
            weeks: results.estimated_weeks,
        });

        Self {
            cards,
            personal_plan: results.personal_plan_message.clone(),
            projection,
        }
    }
}

fn kcal_card(title: &'static str, kcal: i64, message: &str) -> MetricCard {
    MetricCard {
        title,
        value: group_thousands(kcal),
        unit: KCAL_PER_DAY.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_health_metrics;
    use crate::types::{ActivityLevel, AgeRange, Gender, Goal, UserProfile};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn profile(current: f64, target: f64) -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            age_range: Some(AgeRange::From25To34),
            height: 180.0,
            current_weight: current,
            target_weight: target,
            activity_level: Some(ActivityLevel::Moderate),
            goal: Some(Goal::LoseWeight),
            energy_level: None,
            email: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_cards_match_messages() {
        let results = calculate_health_metrics(&profile(80.0, 75.0));
        let view = ResultsView::new(&results);

        assert_eq!(view.cards.len(), 4);
        assert_eq!(view.cards[0].value, "24.7");
        assert_eq!(view.cards[0].unit, "• normal weight");
        assert!(view.cards[0].message.contains("24.7"));

        assert_eq!(view.cards[1].value, "1,853");
        assert!(view.cards[1].message.contains("1,853"));
        assert_eq!(view.cards[2].value, "2,873");
        assert_eq!(view.cards[3].value, "2,373");
        assert!(view.cards[3].message.contains("2,373"));
    }

    #[test]
    fn test_projection_only_when_losing() {
        let losing = ResultsView::new(&calculate_health_metrics(&profile(80.0, 75.0)));
        assert_eq!(
            losing.projection,
            Some(WeightProjection {
                kilograms: "5.0".to_string(),
                weeks: 10,
            })
        );

        let gaining = ResultsView::new(&calculate_health_metrics(&profile(70.0, 75.0)));
        assert_eq!(gaining.projection, None);
    }

    #[test]
    fn test_projection_rounds_half_kilograms_up() {
        let view = ResultsView::new(&calculate_health_metrics(&profile(80.0, 77.75)));
        let projection = view.projection.unwrap();
        assert_eq!(projection.kilograms, "2.3");
        assert_eq!(projection.weeks, 5);
    }
}
