//! Questionnaire scoring and resumable test-taking sessions.
//!
//! Leaf-first: `categories` maps questions to input variables, `formulas` holds the
//! declarative trait table, `scoring` evaluates it, and `session`/`service` drive the
//! paginated, incrementally persisted lifecycle against a `repository`.

pub mod categories;
pub mod domain;
pub mod formulas;
pub mod intake;
pub mod memory;
pub mod repository;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use categories::{resolve, CategoryMap};
pub use domain::{
    merge_responses, CategoryCode, Domain, LikertValue, Question, QuestionId, ResponseMap,
    ResultId, ResultKey, SessionStatus, TestId, TestResult, TestResultView, TraitScores, UserId,
    NEUTRAL_VALUE,
};
pub use formulas::{FormulaError, FormulaModel, FormulaTerm, TraitFormula};
pub use intake::{parse_responses, InputViolation};
pub use memory::{InMemoryQuestionBank, InMemoryResultRepository};
pub use repository::{QuestionBank, RepositoryError, ResultRepository};
pub use scoring::{evaluate, ScoreReport, ScoringEngine, TraitScore};
pub use service::{AssessmentService, ContinueOutcome};
pub use session::{AssessmentSession, Navigation};

/// Error raised by the assessment engine.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputViolation),
    #[error("{0} not found")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<FormulaError> for AssessmentError {
    fn from(value: FormulaError) -> Self {
        Self::InvalidInput(InputViolation::Formula(value))
    }
}
