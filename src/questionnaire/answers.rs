//! Accumulating answer map
//!
//! Answers are stored by question id as they arrive. `to_profile` is the
//! boundary where the free-form map is parsed into the closed vocabularies of
//! `UserProfile`.

use crate::error::FunnelError;
use crate::questionnaire::questions::ids;
use crate::types::{ActivityLevel, AgeRange, Gender, Goal, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single stored answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Choice(String),
    Choices(BTreeSet<String>),
    Number(f64),
    Text(String),
}

impl Answer {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Answer::Choice(s) | Answer::Text(s) => serde_json::Value::from(s.as_str()),
            Answer::Choices(set) => serde_json::Value::from(set.iter().cloned().collect::<Vec<_>>()),
            Answer::Number(n) => serde_json::Value::from(*n),
        }
    }
}

/// Answers keyed by question id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap {
    answers: BTreeMap<String, Answer>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Answer> {
        self.answers.get(id)
    }

    pub fn set(&mut self, id: &str, answer: Answer) {
        self.answers.insert(id.to_string(), answer);
    }

    pub fn remove(&mut self, id: &str) -> Option<Answer> {
        self.answers.remove(id)
    }

    /// Flip membership of `value` in a multi-choice answer.
    ///
    /// Returns true when the value is now selected.
    pub fn toggle(&mut self, id: &str, value: &str) -> bool {
        let entry = self
            .answers
            .entry(id.to_string())
            .or_insert_with(|| Answer::Choices(BTreeSet::new()));

        if !matches!(entry, Answer::Choices(_)) {
            *entry = Answer::Choices(BTreeSet::new());
        }

        match entry {
            Answer::Choices(set) => {
                if set.remove(value) {
                    false
                } else {
                    set.insert(value.to_string());
                    true
                }
            }
            _ => false,
        }
    }

    pub fn choice(&self, id: &str) -> Option<&str> {
        match self.answers.get(id) {
            Some(Answer::Choice(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn choices(&self, id: &str) -> Option<&BTreeSet<String>> {
        match self.answers.get(id) {
            Some(Answer::Choices(set)) => Some(set),
            _ => None,
        }
    }

    pub fn number(&self, id: &str) -> Option<f64> {
        match self.answers.get(id) {
            Some(Answer::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.answers.get(id) {
            Some(Answer::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Freeze the answers into a calculator profile.
    ///
    /// Gender and the three slider values are required. Age, activity level
    /// and goal are optional and resolve to calculator defaults when absent.
    pub fn to_profile(&self) -> Result<UserProfile, FunnelError> {
        let gender: Gender = self
            .choice(ids::GENDER)
            .ok_or_else(|| FunnelError::MissingField(ids::GENDER.to_string()))?
            .parse()?;

        let age_range = self.choice(ids::AGE).map(str::parse::<AgeRange>).transpose()?;
        let activity_level = self
            .choice(ids::ACTIVITY_LEVEL)
            .map(str::parse::<ActivityLevel>)
            .transpose()?;
        let goal = self.choice(ids::GOAL).map(str::parse::<Goal>).transpose()?;

        let extra = self
            .answers
            .iter()
            .filter(|(id, _)| !is_profile_field(id))
            .map(|(id, answer)| (id.clone(), answer.to_json()))
            .collect();

        Ok(UserProfile {
            gender,
            age_range,
            height: self.required_number(ids::HEIGHT)?,
            current_weight: self.required_number(ids::CURRENT_WEIGHT)?,
            target_weight: self.required_number(ids::TARGET_WEIGHT)?,
            activity_level,
            goal,
            energy_level: self.choice(ids::ENERGY_LEVEL).map(str::to_string),
            email: self.text(ids::EMAIL).map(|s| s.trim().to_string()),
            extra,
        })
    }

    fn required_number(&self, id: &str) -> Result<f64, FunnelError> {
        self.number(id)
            .ok_or_else(|| FunnelError::MissingField(id.to_string()))
    }
}

fn is_profile_field(id: &str) -> bool {
    [
        ids::GENDER,
        ids::AGE,
        ids::HEIGHT,
        ids::CURRENT_WEIGHT,
        ids::TARGET_WEIGHT,
        ids::ACTIVITY_LEVEL,
        ids::GOAL,
        ids::ENERGY_LEVEL,
        ids::EMAIL,
    ]
    .contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_answers() -> AnswerMap {
        let mut answers = AnswerMap::new();
        answers.set(ids::GENDER, Answer::Choice("male".into()));
        answers.set(ids::HEIGHT, Answer::Number(180.0));
        answers.set(ids::CURRENT_WEIGHT, Answer::Number(80.0));
        answers.set(ids::TARGET_WEIGHT, Answer::Number(72.0));
        answers
    }

    #[test]
    fn test_toggle_membership() {
        let mut answers = AnswerMap::new();
        assert!(answers.toggle(ids::CHALLENGES, "time"));
        assert!(answers.toggle(ids::CHALLENGES, "stress"));
        assert!(!answers.toggle(ids::CHALLENGES, "time"));

        let set = answers.choices(ids::CHALLENGES).unwrap();
        assert_eq!(set.iter().map(String::as_str).collect::<Vec<_>>(), vec!["stress"]);
    }

    #[test]
    fn test_minimal_profile_uses_optional_defaults() {
        let profile = minimal_answers().to_profile().unwrap();

        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.age_range, None);
        assert_eq!(profile.goal, None);
        assert_eq!(profile.height, 180.0);
        assert_eq!(profile.target_weight, 72.0);
        assert_eq!(profile.age_years(), 30.0);
    }

    #[test]
    fn test_missing_gender_is_reported() {
        let mut answers = minimal_answers();
        answers.remove(ids::GENDER);

        match answers.to_profile() {
            Err(FunnelError::MissingField(field)) => assert_eq!(field, "gender"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_answers_are_carried() {
        let mut answers = minimal_answers();
        answers.set("timeline", Answer::Choice("3-months".into()));
        answers.toggle(ids::CHALLENGES, "cravings");
        answers.set(ids::ENERGY_LEVEL, Answer::Choice("low".into()));
        answers.set(ids::EMAIL, Answer::Text("  me@example.com ".into()));

        let profile = answers.to_profile().unwrap();

        assert_eq!(profile.energy_level.as_deref(), Some("low"));
        assert_eq!(profile.email.as_deref(), Some("me@example.com"));
        assert_eq!(profile.extra["timeline"], "3-months");
        assert_eq!(profile.extra["challenges"], serde_json::json!(["cravings"]));
        assert!(!profile.extra.contains_key(ids::GENDER));
    }

    #[test]
    fn test_unknown_goal_value_is_rejected() {
        let mut answers = minimal_answers();
        answers.set(ids::GOAL, Answer::Choice("bulk-up".into()));

        assert!(matches!(
            answers.to_profile(),
            Err(FunnelError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_answer_map_json() {
        let answers = minimal_answers();
        let json = serde_json::to_string(&answers).unwrap();
        assert!(json.contains(r#""gender":{"kind":"choice","value":"male"}"#));

        let parsed: AnswerMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answers);
    }
}
