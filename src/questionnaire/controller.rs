//! Questionnaire state machine
//!
//! Holds the current step and the accumulating answers. Transitions are
//! instantaneous: the auto-advance that follows a single-choice answer is
//! reported to the caller, which owns any visual delay before calling
//! `advance`.

use crate::calculator::{HarrisBenedict, MetricsCalculator};
use crate::error::FunnelError;
use crate::questionnaire::answers::{Answer, AnswerMap};
use crate::questionnaire::questions::{questions, Question, QuestionKind};
use crate::types::{HealthResults, UserProfile};
use serde::Serialize;
use tracing::{debug, info};

/// What the view should do after a `select`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Stay on the step (multi-choice, non-current question, or final step)
    Stay,
    /// Advance once the selection animation has played
    AutoAdvance,
}

/// Result of an `advance` call
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The current step is not answered yet; nothing changed
    Blocked,
    /// Moved forward to the given step index
    Moved(usize),
    /// The final step was submitted and the metrics computed
    Completed(Box<Completion>),
}

/// Frozen outcome of a finished questionnaire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub profile: UserProfile,
    pub results: HealthResults,
}

/// Step-by-step questionnaire controller
pub struct QuestionnaireController<C = HarrisBenedict> {
    questions: &'static [Question],
    current_step: usize,
    answers: AnswerMap,
    calculator: C,
    completed: bool,
}

impl Default for QuestionnaireController<HarrisBenedict> {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionnaireController<HarrisBenedict> {
    /// Controller over the funnel's questionnaire
    pub fn new() -> Self {
        Self::build(questions(), HarrisBenedict)
    }
}

impl<C: MetricsCalculator> QuestionnaireController<C> {
    /// Controller over the funnel's questionnaire with a custom calculator
    pub fn with_calculator(calculator: C) -> Self {
        Self::build(questions(), calculator)
    }

    /// Controller over an arbitrary, non-empty question list
    pub fn with_questions(
        questions: &'static [Question],
        calculator: C,
    ) -> Result<Self, FunnelError> {
        if questions.is_empty() {
            return Err(FunnelError::ConfigError(
                "questionnaire needs at least one step".to_string(),
            ));
        }
        Ok(Self::build(questions, calculator))
    }

    fn build(questions: &'static [Question], calculator: C) -> Self {
        let mut answers = AnswerMap::new();
        for q in questions {
            if let (QuestionKind::Slider, Some(default)) = (q.kind, q.default) {
                answers.set(q.id, Answer::Number(default));
            }
        }

        Self {
            questions,
            current_step: 0,
            answers,
            calculator,
            completed: false,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn step_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> &'static Question {
        &self.questions[self.current_step]
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.questions.len()
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Progress bar fill, 0-100, counting the current step as reached
    pub fn progress_percent(&self) -> f64 {
        (self.current_step + 1) as f64 / self.questions.len() as f64 * 100.0
    }

    /// Record a choice.
    ///
    /// Single-choice questions overwrite the answer; multi-choice questions
    /// toggle the value in their set.
    pub fn select(&mut self, question_id: &str, value: &str) -> Result<Selection, FunnelError> {
        self.ensure_open()?;
        let question = self.question(question_id)?;

        if !question.kind.is_choice() {
            return Err(kind_mismatch(question, "choice"));
        }
        if !question.has_option(value) {
            return Err(FunnelError::UnknownOption {
                question: question.id.to_string(),
                value: value.to_string(),
            });
        }

        if question.kind == QuestionKind::Multi {
            let selected = self.answers.toggle(question.id, value);
            debug!(question = question.id, value, selected, "toggled option");
            return Ok(Selection::Stay);
        }

        self.answers.set(question.id, Answer::Choice(value.to_string()));
        debug!(question = question.id, value, "selected option");

        let is_current = self.current_question().id == question.id;
        if is_current && !self.is_last_step() {
            Ok(Selection::AutoAdvance)
        } else {
            Ok(Selection::Stay)
        }
    }

    /// Record a slider or number value, clamped to the control's range
    pub fn set_numeric(&mut self, question_id: &str, value: f64) -> Result<(), FunnelError> {
        self.ensure_open()?;
        let question = self.question(question_id)?;

        if !question.kind.is_numeric() {
            return Err(kind_mismatch(question, "numeric"));
        }
        if !value.is_finite() {
            return Err(FunnelError::InvalidValue {
                field: question.id.to_string(),
                value: value.to_string(),
            });
        }

        self.answers.set(question.id, Answer::Number(question.clamp(value)));
        Ok(())
    }

    /// Record free text or an email address as typed
    pub fn set_text(&mut self, question_id: &str, value: &str) -> Result<(), FunnelError> {
        self.ensure_open()?;
        let question = self.question(question_id)?;

        if !question.kind.is_text() {
            return Err(kind_mismatch(question, "text"));
        }

        self.answers.set(question.id, Answer::Text(value.to_string()));
        Ok(())
    }

    /// Whether the current step is answered well enough to move on
    pub fn can_advance(&self) -> bool {
        let question = self.current_question();
        match question.kind {
            QuestionKind::Single => self.answers.choice(question.id).is_some_and(|s| !s.is_empty()),
            QuestionKind::Multi => self.answers.choices(question.id).is_some_and(|s| !s.is_empty()),
            QuestionKind::Number | QuestionKind::Slider => self.answers.number(question.id).is_some(),
            QuestionKind::Input | QuestionKind::Email => self
                .answers
                .text(question.id)
                .is_some_and(|s| !s.trim().is_empty()),
        }
    }

    /// Move to the next step, or submit on the final step.
    ///
    /// Submission validates the email (it must contain '@'); on failure the
    /// step is kept and the calculator is not called.
    pub fn advance(&mut self) -> Result<Advance, FunnelError> {
        self.ensure_open()?;

        if !self.can_advance() {
            return Ok(Advance::Blocked);
        }

        if !self.is_last_step() {
            self.current_step += 1;
            debug!(
                step = self.current_step,
                question = self.current_question().id,
                "advanced"
            );
            return Ok(Advance::Moved(self.current_step));
        }

        let question = self.current_question();
        if question.kind == QuestionKind::Email {
            let email = self.answers.text(question.id).unwrap_or_default();
            if !email.contains('@') {
                info!("rejected submission with invalid email");
                return Err(FunnelError::InvalidEmail(email.to_string()));
            }
        }

        let profile = self.answers.to_profile()?;
        let results = self.calculator.calculate(&profile);
        self.completed = true;

        info!(
            bmi = results.bmi,
            category = results.bmi_category.as_str(),
            calorie_target = results.calorie_target,
            "questionnaire completed"
        );

        Ok(Advance::Completed(Box::new(Completion { profile, results })))
    }

    /// Step back; no-op on the first step
    pub fn retreat(&mut self) -> bool {
        if self.completed || self.current_step == 0 {
            return false;
        }
        self.current_step -= 1;
        true
    }

    fn question(&self, id: &str) -> Result<&'static Question, FunnelError> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| FunnelError::UnknownQuestion(id.to_string()))
    }

    fn ensure_open(&self) -> Result<(), FunnelError> {
        if self.completed {
            Err(FunnelError::AlreadyCompleted)
        } else {
            Ok(())
        }
    }
}

fn kind_mismatch(question: &Question, kind: &'static str) -> FunnelError {
    FunnelError::AnswerKindMismatch {
        question: question.id.to_string(),
        kind,
    }
}
