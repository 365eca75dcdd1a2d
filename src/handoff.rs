//! Session hand-off store
//!
//! A session-scoped key/value context passed explicitly from the
//! questionnaire to the plans page. Values are strings, as they would be in
//! browser session storage; the whole store serializes to JSON so a host can
//! persist it between page loads.

use crate::types::{Gender, Goal, HealthResults, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Set once the questionnaire has been submitted
pub const COMPLETED_KEY: &str = "slimvita-questionnaire-completed";

/// Flat JSON record consumed by the plans page
pub const USER_DATA_KEY: &str = "slimvita-user-data";

/// Profile subset plus results, written once at completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub gender: Gender,
    pub current_weight: f64,
    pub target_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(flatten)]
    pub results: HealthResults,
    pub completed_at: DateTime<Utc>,
}

impl HandoffRecord {
    pub fn new(profile: &UserProfile, results: &HealthResults) -> Self {
        Self {
            gender: profile.gender,
            current_weight: profile.current_weight,
            target_weight: profile.target_weight,
            height: Some(profile.height),
            energy_level: profile.energy_level.clone(),
            goal: profile.goal,
            results: results.clone(),
            completed_at: Utc::now(),
        }
    }
}

/// Explicit session context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStore {
    session_id: String,
    #[serde(default)]
    entries: HashMap<String, String>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Empty store with a fresh session id
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Drop every entry; the session id is kept
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.get(COMPLETED_KEY) == Some("true")
    }

    /// Write the hand-off record and raise the completed flag
    pub fn record_completion(
        &mut self,
        profile: &UserProfile,
        results: &HealthResults,
    ) -> Result<HandoffRecord, serde_json::Error> {
        let record = HandoffRecord::new(profile, results);
        let json = serde_json::to_string(&record)?;

        self.set(USER_DATA_KEY, json);
        self.set(COMPLETED_KEY, "true");
        debug!(session = %self.session_id, "recorded questionnaire hand-off");

        Ok(record)
    }

    /// Read the hand-off record.
    ///
    /// Best effort: an absent or unreadable record yields `None` so the caller
    /// can fall back to its defaults.
    pub fn load_handoff(&self) -> Option<HandoffRecord> {
        let raw = self.get(USER_DATA_KEY)?;
        match serde_json::from_str(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "ignoring unreadable hand-off record");
                None
            }
        }
    }

    /// Deserialize a persisted store
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the store for persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_health_metrics;
    use crate::types::ActivityLevel;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn profile() -> UserProfile {
        UserProfile {
            gender: Gender::Male,
            age_range: None,
            height: 180.0,
            current_weight: 92.0,
            target_weight: 80.0,
            activity_level: Some(ActivityLevel::Light),
            goal: Some(Goal::LoseWeight),
            energy_level: Some("variable".to_string()),
            email: Some("me@example.com".to_string()),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_handoff_round_trip() {
        let profile = profile();
        let results = calculate_health_metrics(&profile);
        let mut store = SessionStore::new();

        assert!(!store.is_completed());
        store.record_completion(&profile, &results).unwrap();
        assert!(store.is_completed());

        let record = store.load_handoff().unwrap();
        assert_eq!(record.current_weight, 92.0);
        assert_eq!(record.target_weight, 80.0);
        assert_eq!(record.gender, Gender::Male);
        assert_eq!(record.goal, Some(Goal::LoseWeight));
        assert_eq!(record.results.bmi_category, results.bmi_category);
        assert_eq!(record.results.calorie_target, results.calorie_target);
        assert_eq!(record.results.personal_plan_message, results.personal_plan_message);
        assert!((record.results.bmi - results.bmi).abs() < 1e-9);
    }

    #[test]
    fn test_record_is_flat() {
        let profile = profile();
        let results = calculate_health_metrics(&profile);
        let mut store = SessionStore::new();
        store.record_completion(&profile, &results).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(store.get(USER_DATA_KEY).unwrap()).unwrap();
        assert_eq!(value["gender"], "male");
        assert_eq!(value["bmi_category"], "overweight");
        assert_eq!(value["calorie_target"], results.calorie_target);
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_unreadable_record_is_ignored() {
        let mut store = SessionStore::new();
        assert!(store.load_handoff().is_none());

        store.set(USER_DATA_KEY, "{not json");
        assert!(store.load_handoff().is_none());
    }

    #[test]
    fn test_clear_keeps_session_id() {
        let mut store = SessionStore::new();
        let id = store.session_id().to_string();
        store.set(COMPLETED_KEY, "true");

        store.clear();

        assert!(store.is_empty());
        assert!(!store.is_completed());
        assert_eq!(store.session_id(), id);
    }

    #[test]
    fn test_store_json_persistence() {
        let profile = profile();
        let results = calculate_health_metrics(&profile);
        let mut store = SessionStore::new();
        store.record_completion(&profile, &results).unwrap();

        let json = store.to_json().unwrap();
        let restored = SessionStore::from_json(&json).unwrap();

        assert_eq!(restored.session_id(), store.session_id());
        assert!(restored.is_completed());
        assert_eq!(restored.load_handoff(), store.load_handoff());
    }
}
