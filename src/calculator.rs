//! Health metrics calculation
//!
//! Maps a frozen `UserProfile` to BMI, BMR (revised Harris-Benedict), TDEE,
//! a goal-dependent calorie target and a rough timeline, together with the
//! human-readable messages shown on the results screen.
//!
//! Every message embeds the same rounded value stored in the corresponding
//! metric field, so views never re-round.

use crate::types::{
    format_bmi, ActivityLevel, BmiCategory, Gender, Goal, HealthResults, UserProfile,
};

/// Daily deficit applied for the lose-weight goal (kcal)
pub const WEIGHT_LOSS_DEFICIT_KCAL: f64 = 500.0;

/// Weeks budgeted per kilogram of weight change
pub const WEEKS_PER_KG: f64 = 2.0;

/// Multiplier used when no activity level was answered
pub const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.2;

/// Seam between the questionnaire controller and the metrics computation
pub trait MetricsCalculator {
    fn calculate(&self, profile: &UserProfile) -> HealthResults;
}

/// Calculator based on the revised Harris-Benedict equations
#[derive(Debug, Clone, Copy, Default)]
pub struct HarrisBenedict;

impl MetricsCalculator for HarrisBenedict {
    fn calculate(&self, profile: &UserProfile) -> HealthResults {
        calculate_health_metrics(profile)
    }
}

/// Compute all health metrics for a profile.
///
/// Pure and deterministic: no clock, no randomness, no I/O.
///
/// Without an activity answer the TDEE uses the sedentary multiplier and the
/// message describes a sedentary lifestyle, so wording and number agree.
/// Without an age range the BMR assumes 30 years.
pub fn calculate_health_metrics(profile: &UserProfile) -> HealthResults {
    let age = profile.age_years();

    let bmi = calculate_bmi(profile.current_weight, profile.height);
    let bmi_category = BmiCategory::from_bmi(bmi);
    let bmi_message = bmi_message(bmi, bmi_category);

    let bmr_exact = calculate_bmr(profile.current_weight, profile.height, age, profile.gender);
    let bmr = bmr_exact.round() as i64;
    let bmr_message = format!(
        "Your basal metabolic rate is {} kcal/day. This represents the minimum energy your body needs to function at rest.",
        group_thousands(bmr)
    );

    // TDEE is derived from the unrounded BMR
    let tdee_exact = bmr_exact * activity_multiplier(profile.activity_level);
    let tdee = tdee_exact.round() as i64;
    let lifestyle = profile
        .activity_level
        .unwrap_or(ActivityLevel::Sedentary)
        .lifestyle();
    let tdee_message = format!(
        "Given your {} lifestyle, your estimated daily caloric burn is {} kcal.",
        lifestyle,
        group_thousands(tdee)
    );

    let (calorie_target, calorie_message) = calorie_target(tdee_exact, profile.goal);

    let weight_to_lose = profile.current_weight - profile.target_weight;
    let estimated_weeks = estimate_weeks(weight_to_lose);

    let focus = profile.goal.unwrap_or(Goal::Health).plan_focus();
    let personal_plan_message = format!(
        "Based on your profile, we are building a treatment plan optimized specifically for your metabolism, activity level, and {}. With consistent effort, you can expect to see meaningful results within {} weeks.",
        focus, estimated_weeks
    );

    HealthResults {
        bmi,
        bmi_category,
        bmi_message,
        bmr,
        bmr_message,
        tdee,
        tdee_message,
        calorie_target,
        calorie_message,
        weight_to_lose,
        estimated_weeks,
        personal_plan_message,
    }
}

/// BMI from weight (kg) and height (cm). A zero height yields 0.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    if height_m == 0.0 {
        return 0.0;
    }
    weight_kg / (height_m * height_m)
}

/// Unrounded BMR (kcal/day)
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: f64, gender: Gender) -> f64 {
    if gender.uses_male_formula() {
        88.36 + 13.4 * weight_kg + 4.8 * height_cm - 5.7 * age_years
    } else {
        447.6 + 9.2 * weight_kg + 3.1 * height_cm - 4.3 * age_years
    }
}

pub fn activity_multiplier(level: Option<ActivityLevel>) -> f64 {
    level
        .map(|l| l.multiplier())
        .unwrap_or(DEFAULT_ACTIVITY_MULTIPLIER)
}

/// Two weeks per kilogram in either direction, at least one week
pub fn estimate_weeks(weight_to_lose: f64) -> u32 {
    (weight_to_lose.abs() * WEEKS_PER_KG).round().max(1.0) as u32
}

fn bmi_message(bmi: f64, category: BmiCategory) -> String {
    let rounded = format_bmi(bmi);
    match category {
        BmiCategory::Underweight => format!(
            "Your BMI is {}, which places you in the underweight category. Our plan will focus on healthy nutrition and building sustainable fitness habits.",
            rounded
        ),
        BmiCategory::NormalWeight => format!(
            "Your BMI is {}, which is within the healthy range. We'll help you optimize your fitness and maintain your great progress.",
            rounded
        ),
        BmiCategory::Overweight => format!(
            "Your BMI is {}, which places you in the overweight category. This indicates that reducing body fat will significantly improve your overall health and energy levels.",
            rounded
        ),
        BmiCategory::Obese => format!(
            "Your BMI is {}. The good news is that our walking program is specifically designed to help you achieve sustainable weight loss and dramatically improve your health markers.",
            rounded
        ),
    }
}

fn calorie_target(tdee: f64, goal: Option<Goal>) -> (i64, String) {
    match goal {
        Some(Goal::LoseWeight) => {
            let target = (tdee - WEIGHT_LOSS_DEFICIT_KCAL).round() as i64;
            let message = format!(
                "To lose weight safely at 0.5-1 lb per week, your recommended daily calorie intake is {} kcal. This creates a healthy 500 kcal deficit.",
                group_thousands(target)
            );
            (target, message)
        }
        Some(Goal::GetFit) => {
            let target = tdee.round() as i64;
            let message = format!(
                "For getting fit and toned, maintain your current calorie intake around {} kcal while increasing protein for muscle definition.",
                group_thousands(target)
            );
            (target, message)
        }
        Some(Goal::Energy) => {
            let target = tdee.round() as i64;
            let message = format!(
                "To boost your energy levels, we recommend {} kcal daily with focus on nutrient-dense foods and proper meal timing.",
                group_thousands(target)
            );
            (target, message)
        }
        Some(Goal::Health) => {
            let target = tdee.round() as i64;
            let message = format!(
                "For optimal health, maintain around {} kcal daily with emphasis on whole foods, vegetables, and balanced macros.",
                group_thousands(target)
            );
            (target, message)
        }
        None => {
            let target = tdee.round() as i64;
            let message = format!(
                "Your recommended daily intake is {} kcal based on your activity level.",
                group_thousands(target)
            );
            (target, message)
        }
    }
}

/// Format an integer with comma thousands separators ("2,373")
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
