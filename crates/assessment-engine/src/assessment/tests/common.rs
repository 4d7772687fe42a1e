use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::assessment::domain::{
    LikertValue, Question, QuestionId, ResponseMap, ResultKey, TestId, TestResult, UserId,
};
use crate::assessment::formulas::{FormulaModel, FormulaTerm, TraitFormula};
use crate::assessment::memory::{InMemoryQuestionBank, InMemoryResultRepository};
use crate::assessment::repository::{RepositoryError, ResultRepository};
use crate::assessment::AssessmentService;
use crate::config::{AssessmentConfig, ResumePolicy};

pub(super) const TEST_ID: &str = "neo-short";
pub(super) const USER_ID: &str = "candidate-7";

pub(super) fn likert(value: i64) -> LikertValue {
    LikertValue::try_from(value).expect("likert value in range")
}

pub(super) fn answers(pairs: &[(&str, i64)]) -> ResponseMap {
    pairs
        .iter()
        .map(|(id, value)| (QuestionId::from(*id), likert(*value)))
        .collect()
}

pub(super) fn question(id: &str, order_index: u32, code: Option<&str>) -> Question {
    Question {
        id: QuestionId::from(id),
        test_id: TestId::from(TEST_ID),
        category_code: code.map(|raw| raw.parse().expect("valid category code")),
        order_index,
        text: format!("statement {id}"),
    }
}

/// Six questions over two pages of three.
pub(super) fn two_page_questions() -> Vec<Question> {
    vec![
        question("q1", 1, Some("A1")),
        question("q2", 2, Some("C2")),
        question("q3", 3, Some("E3")),
        question("q4", 4, Some("N4")),
        question("q5", 5, Some("O5")),
        question("q6", 6, None),
    ]
}

pub(super) fn key() -> ResultKey {
    ResultKey::new(TestId::from(TEST_ID), UserId::from(USER_ID))
}

pub(super) fn term(code: &str, weight: f64, inverted: bool) -> FormulaTerm {
    FormulaTerm {
        code: code.parse().expect("valid category code"),
        weight,
        inverted,
    }
}

pub(super) fn formula(name: &str, facet: &str, terms: Vec<FormulaTerm>) -> TraitFormula {
    let denominator = terms.iter().map(|term| term.weight * 5.0).sum();
    TraitFormula {
        trait_name: name.to_string(),
        facet: facet.parse().expect("valid category code"),
        terms,
        denominator,
    }
}

/// `trust = 2·A1 / 10`.
pub(super) fn trust_model() -> FormulaModel {
    FormulaModel::new(vec![formula("trust", "A1", vec![term("A1", 2.0, false)])])
        .expect("trust model validates")
}

pub(super) fn config(page_size: usize) -> AssessmentConfig {
    AssessmentConfig {
        page_size,
        resume_policy: ResumePolicy::FirstPage,
        max_merge_attempts: 3,
        formula_path: None,
    }
}

pub(super) fn bank(questions: Vec<Question>) -> Arc<InMemoryQuestionBank> {
    Arc::new(InMemoryQuestionBank::default().with_test(TestId::from(TEST_ID), questions))
}

pub(super) fn build_service(
    questions: Vec<Question>,
    page_size: usize,
) -> (
    AssessmentService<InMemoryResultRepository, InMemoryQuestionBank>,
    Arc<InMemoryResultRepository>,
) {
    let repository = Arc::new(InMemoryResultRepository::default());
    let service = AssessmentService::new(
        repository.clone(),
        bank(questions),
        FormulaModel::standard(),
        config(page_size),
    );
    (service, repository)
}

/// Store whose first `failures` updates report the backend as unavailable.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryResultRepository,
    pub(super) failures: AtomicUsize,
}

impl FlakyRepository {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            inner: InMemoryResultRepository::default(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl ResultRepository for FlakyRepository {
    fn insert(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.inner.update(record)
    }

    fn fetch(&self, key: &ResultKey) -> Result<Option<TestResult>, RepositoryError> {
        self.inner.fetch(key)
    }
}

/// Store that lets a concurrent writer slip in an answer before the first update lands.
pub(super) struct RacingRepository {
    pub(super) inner: InMemoryResultRepository,
    pub(super) concurrent: ResponseMap,
    pub(super) raced: AtomicUsize,
}

impl RacingRepository {
    pub(super) fn new(concurrent: ResponseMap) -> Self {
        Self {
            inner: InMemoryResultRepository::default(),
            concurrent,
            raced: AtomicUsize::new(0),
        }
    }
}

impl ResultRepository for RacingRepository {
    fn insert(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        if self.raced.fetch_add(1, Ordering::SeqCst) == 0 {
            let mut other = self
                .inner
                .fetch(&record.key())?
                .ok_or(RepositoryError::NotFound)?;
            other.responses.extend(self.concurrent.clone());
            self.inner.update(other)?;
        }
        self.inner.update(record)
    }

    fn fetch(&self, key: &ResultKey) -> Result<Option<TestResult>, RepositoryError> {
        self.inner.fetch(key)
    }
}

/// Store whose every update collides with another writer.
#[derive(Default)]
pub(super) struct ContendedRepository {
    pub(super) inner: InMemoryResultRepository,
}

impl ResultRepository for ContendedRepository {
    fn insert(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, _record: TestResult) -> Result<TestResult, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, key: &ResultKey) -> Result<Option<TestResult>, RepositoryError> {
        self.inner.fetch(key)
    }
}
