//! Multi-step questionnaire
//!
//! - `questions`: the static step definitions
//! - `answers`: the accumulating answer map and profile parsing
//! - `controller`: the step state machine
//! - `events`: serialized input for hosts driving the controller remotely

pub mod answers;
pub mod controller;
pub mod events;
pub mod questions;

pub use answers::{Answer, AnswerMap};
pub use controller::{Advance, Completion, QuestionnaireController, Selection};
pub use events::{AnswerEvent, StepReport};
pub use questions::{find_question, ids, questions, Question, QuestionKind, QuestionOption};
