//! Serialized questionnaire input
//!
//! Hosts without direct access to the controller (the CLI's NDJSON stream,
//! the C ABI) drive it with `AnswerEvent`s and read back a `StepReport`.

use crate::calculator::MetricsCalculator;
use crate::error::FunnelError;
use crate::questionnaire::controller::{Advance, Completion, QuestionnaireController, Selection};
use crate::questionnaire::questions::Question;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AnswerEvent {
    Select { question: String, value: String },
    Number { question: String, value: f64 },
    Text { question: String, value: String },
    Advance,
    Retreat,
}

/// Controller state after an event
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub step_count: usize,
    pub question: &'static Question,
    pub can_advance: bool,
    /// A single-choice answer asked for an automatic advance
    pub auto_advance: bool,
    /// The step did not change because it was unanswered
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

impl<C: MetricsCalculator> QuestionnaireController<C> {
    /// Apply one event and report the resulting state
    pub fn apply(&mut self, event: &AnswerEvent) -> Result<StepReport, FunnelError> {
        let mut auto_advance = false;
        let mut blocked = false;
        let mut completion = None;

        match event {
            AnswerEvent::Select { question, value } => {
                auto_advance = self.select(question, value)? == Selection::AutoAdvance;
            }
            AnswerEvent::Number { question, value } => self.set_numeric(question, *value)?,
            AnswerEvent::Text { question, value } => self.set_text(question, value)?,
            AnswerEvent::Advance => match self.advance()? {
                Advance::Blocked => blocked = true,
                Advance::Moved(_) => {}
                Advance::Completed(done) => completion = Some(*done),
            },
            AnswerEvent::Retreat => {
                self.retreat();
            }
        }

        Ok(StepReport {
            step: self.current_step(),
            step_count: self.step_count(),
            question: self.current_question(),
            can_advance: self.can_advance(),
            auto_advance,
            blocked,
            completion,
        })
    }
}
