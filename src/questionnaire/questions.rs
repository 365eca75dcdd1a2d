//! Static questionnaire definition
//!
//! The ordered list of steps the controller walks through. Option values are
//! the canonical strings the answer map stores and the profile parser reads.

use serde::Serialize;

/// Question ids the profile builder reads
pub mod ids {
    pub const GENDER: &str = "gender";
    pub const AGE: &str = "age";
    pub const HEIGHT: &str = "height";
    pub const CURRENT_WEIGHT: &str = "currentWeight";
    pub const TARGET_WEIGHT: &str = "targetWeight";
    pub const GOAL: &str = "goal";
    pub const ACTIVITY_LEVEL: &str = "activityLevel";
    pub const ENERGY_LEVEL: &str = "energyLevel";
    pub const CHALLENGES: &str = "challenges";
    pub const EMAIL: &str = "email";
}

/// Input control a question is answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Exactly one option; selecting it schedules an auto-advance
    Single,
    /// Any number of options, toggled individually
    Multi,
    Number,
    Slider,
    /// Free text
    Input,
    Email,
}

impl QuestionKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionKind::Number | QuestionKind::Slider)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, QuestionKind::Input | QuestionKind::Email)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, QuestionKind::Single | QuestionKind::Multi)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// One questionnaire step
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "<[QuestionOption]>::is_empty")]
    pub options: &'static [QuestionOption],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Initial slider position; seeded into the answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

impl Question {
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Clamp a numeric answer to the control's range
    pub fn clamp(&self, value: f64) -> f64 {
        let lower = self.min.map_or(value, |min| value.max(min));
        self.max.map_or(lower, |max| lower.min(max))
    }
}

macro_rules! opt {
    ($value:expr, $label:expr) => {
        QuestionOption {
            value: $value,
            label: $label,
        }
    };
}

const fn single(id: &'static str, title: &'static str, options: &'static [QuestionOption]) -> Question {
    choice(id, title, QuestionKind::Single, options)
}

const fn choice(
    id: &'static str,
    title: &'static str,
    kind: QuestionKind,
    options: &'static [QuestionOption],
) -> Question {
    Question {
        id,
        title,
        kind,
        options,
        min: None,
        max: None,
        default: None,
        unit: None,
        placeholder: None,
    }
}

const fn slider(
    id: &'static str,
    title: &'static str,
    min: f64,
    max: f64,
    default: f64,
    unit: &'static str,
) -> Question {
    Question {
        id,
        title,
        kind: QuestionKind::Slider,
        options: &[],
        min: Some(min),
        max: Some(max),
        default: Some(default),
        unit: Some(unit),
        placeholder: None,
    }
}

static QUESTIONS: &[Question] = &[
    single(
        ids::GENDER,
        "What's your gender?",
        &[opt!("female", "Female"), opt!("male", "Male"), opt!("other", "Other")],
    ),
    single(
        ids::AGE,
        "How old are you?",
        &[
            opt!("18-24", "18-24 years"),
            opt!("25-34", "25-34 years"),
            opt!("35-44", "35-44 years"),
            opt!("45-54", "45-54 years"),
            opt!("55-64", "55-64 years"),
            opt!("65+", "65+ years"),
        ],
    ),
    slider(ids::HEIGHT, "What's your height?", 140.0, 220.0, 170.0, "cm"),
    slider(ids::CURRENT_WEIGHT, "What's your current weight?", 40.0, 200.0, 85.0, "kg"),
    slider(ids::TARGET_WEIGHT, "What's your target weight?", 40.0, 200.0, 75.0, "kg"),
    single(
        ids::GOAL,
        "What's your main goal?",
        &[
            opt!("lose-weight", "Lose Weight"),
            opt!("get-fit", "Get Fit & Toned"),
            opt!("energy", "Boost Energy"),
            opt!("health", "Improve Health"),
        ],
    ),
    single(
        "timeline",
        "When do you want to reach your goal?",
        &[
            opt!("1-month", "Within 1 month"),
            opt!("3-months", "Within 3 months"),
            opt!("6-months", "Within 6 months"),
            opt!("no-rush", "No rush"),
        ],
    ),
    single(
        ids::ACTIVITY_LEVEL,
        "What's your current activity level?",
        &[
            opt!("sedentary", "Sedentary"),
            opt!("light", "Lightly Active"),
            opt!("moderate", "Moderately Active"),
            opt!("active", "Very Active"),
        ],
    ),
    single(
        "dailySteps",
        "How many steps do you average daily?",
        &[
            opt!("under-3000", "Under 3,000"),
            opt!("3000-5000", "3,000 - 5,000"),
            opt!("5000-8000", "5,000 - 8,000"),
            opt!("8000-10000", "8,000 - 10,000"),
            opt!("over-10000", "Over 10,000"),
        ],
    ),
    single(
        "dailyRoutine",
        "How would you describe your daily routine?",
        &[
            opt!("desk-job", "Mostly Sitting"),
            opt!("mixed", "Mixed"),
            opt!("on-feet", "On My Feet"),
            opt!("physical", "Very Physical"),
        ],
    ),
    single(
        ids::ENERGY_LEVEL,
        "How's your energy level throughout the day?",
        &[
            opt!("low", "Low Energy"),
            opt!("variable", "Up and Down"),
            opt!("moderate", "Moderate"),
            opt!("high", "High Energy"),
        ],
    ),
    single(
        "nightHunger",
        "Do you experience hunger at night?",
        &[
            opt!("always", "Yes, Always"),
            opt!("sometimes", "Sometimes"),
            opt!("rarely", "Rarely"),
            opt!("never", "Never"),
        ],
    ),
    choice(
        ids::CHALLENGES,
        "What are your biggest challenges?",
        QuestionKind::Multi,
        &[
            opt!("motivation", "Staying Motivated"),
            opt!("time", "Finding Time"),
            opt!("cravings", "Food Cravings"),
            opt!("stress", "Stress Eating"),
            opt!("consistency", "Being Consistent"),
            opt!("energy", "Low Energy"),
            opt!("injuries", "Past Injuries"),
            opt!("knowledge", "Lack of Knowledge"),
        ],
    ),
    single(
        "dietQuality",
        "How would you rate your current diet?",
        &[
            opt!("poor", "Could Be Better"),
            opt!("fair", "Fair"),
            opt!("good", "Pretty Good"),
            opt!("excellent", "Excellent"),
        ],
    ),
    single(
        "eatingOut",
        "How often do you eat out or order food?",
        &[
            opt!("daily", "Daily"),
            opt!("several", "Several Times/Week"),
            opt!("weekly", "Once a Week"),
            opt!("rarely", "Rarely"),
        ],
    ),
    single(
        "currentDiet",
        "Do you follow any specific diet?",
        &[
            opt!("none", "No Specific Diet"),
            opt!("keto", "Keto / Low Carb"),
            opt!("vegetarian", "Vegetarian"),
            opt!("vegan", "Vegan"),
            opt!("mediterranean", "Mediterranean"),
            opt!("intermittent", "Intermittent Fasting"),
        ],
    ),
    single(
        "walkingDuration",
        "How long can you walk per session?",
        &[
            opt!("10-15", "10-15 minutes"),
            opt!("20-30", "20-30 minutes"),
            opt!("30-45", "30-45 minutes"),
            opt!("45+", "45+ minutes"),
        ],
    ),
    single(
        "fitnessLevel",
        "What's your current fitness level?",
        &[
            opt!("beginner", "Beginner"),
            opt!("intermediate", "Intermediate"),
            opt!("advanced", "Advanced"),
        ],
    ),
    single(
        "intensity",
        "What walking intensity do you prefer?",
        &[
            opt!("light", "Light & Easy"),
            opt!("moderate", "Moderate"),
            opt!("brisk", "Brisk"),
            opt!("power", "Power Walking"),
        ],
    ),
    single(
        "availableTime",
        "How much time can you dedicate daily?",
        &[
            opt!("15-20", "15-20 minutes"),
            opt!("30", "About 30 minutes"),
            opt!("45", "About 45 minutes"),
            opt!("60+", "60+ minutes"),
        ],
    ),
    single(
        "preferredTime",
        "When do you prefer to walk?",
        &[
            opt!("morning", "Morning"),
            opt!("afternoon", "Afternoon"),
            opt!("evening", "Evening"),
            opt!("flexible", "Flexible"),
        ],
    ),
    single(
        "permission",
        "Ready to transform your health?",
        &[opt!("yes", "Yes, Create My Plan!"), opt!("maybe", "Tell Me More First")],
    ),
    Question {
        id: ids::EMAIL,
        title: "Where should we send your plan?",
        kind: QuestionKind::Email,
        options: &[],
        min: None,
        max: None,
        default: None,
        unit: None,
        placeholder: Some("your@email.com"),
    },
];

/// The funnel's questionnaire, in display order
pub fn questions() -> &'static [Question] {
    QUESTIONS
}

pub fn find_question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_question_ids_are_unique() {
        let ids: HashSet<&str> = questions().iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), questions().len());
        assert_eq!(questions().len(), 23);
    }

    #[test]
    fn test_last_step_is_email() {
        let last = questions().last().unwrap();
        assert_eq!(last.id, ids::EMAIL);
        assert_eq!(last.kind, QuestionKind::Email);
    }

    #[test]
    fn test_sliders_have_bounds_and_defaults_in_range() {
        for q in questions().iter().filter(|q| q.kind == QuestionKind::Slider) {
            let (min, max, default) = (q.min.unwrap(), q.max.unwrap(), q.default.unwrap());
            assert!(min < max, "{} has inverted bounds", q.id);
            assert!(default >= min && default <= max, "{} default out of range", q.id);
        }
        assert_eq!(find_question(ids::HEIGHT).unwrap().min, Some(140.0));
        assert_eq!(find_question(ids::TARGET_WEIGHT).unwrap().max, Some(200.0));
    }

    #[test]
    fn test_clamp() {
        let height = find_question(ids::HEIGHT).unwrap();
        assert_eq!(height.clamp(100.0), 140.0);
        assert_eq!(height.clamp(250.0), 220.0);
        assert_eq!(height.clamp(181.5), 181.5);
    }

    #[test]
    fn test_choice_questions_have_options() {
        for q in questions().iter().filter(|q| q.kind.is_choice()) {
            assert!(!q.options.is_empty(), "{} has no options", q.id);
        }
        assert!(find_question(ids::GOAL).unwrap().has_option("lose-weight"));
        assert!(!find_question(ids::GOAL).unwrap().has_option("bulk-up"));
    }
}
