use super::domain::{Question, ResultKey, TestId, TestResult};

/// Keyed store for test results, one record per `(test_id, user_id)`.
pub trait ResultRepository: Send + Sync {
    /// Store a new record; `Conflict` when the key already exists.
    fn insert(&self, record: TestResult) -> Result<TestResult, RepositoryError>;
    /// Replace a record whose `revision` matches the stored one and return it with the
    /// bumped revision; `Conflict` when stale, `NotFound` when absent.
    fn update(&self, record: TestResult) -> Result<TestResult, RepositoryError>;
    fn fetch(&self, key: &ResultKey) -> Result<Option<TestResult>, RepositoryError>;
}

/// Source of question definitions for a test.
pub trait QuestionBank: Send + Sync {
    /// `NotFound` for an unknown test.
    fn questions(&self, test_id: &TestId) -> Result<Vec<Question>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
