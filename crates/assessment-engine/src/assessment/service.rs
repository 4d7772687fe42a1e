use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::categories::resolve;
use super::domain::{
    merge_responses, Question, ResponseMap, ResultId, ResultKey, TestId, TestResult, UserId,
};
use super::formulas::FormulaModel;
use super::intake::{ensure_known_questions, parse_responses, InputViolation};
use super::repository::{QuestionBank, RepositoryError, ResultRepository};
use super::scoring::ScoringEngine;
use super::session::{progress_percentage, AssessmentSession};
use super::AssessmentError;
use crate::config::AssessmentConfig;

/// Result of a "continue" action.
#[derive(Debug, Clone, PartialEq)]
pub enum ContinueOutcome {
    Advanced { page: usize, progress: u8 },
    Completed(TestResult),
}

/// Service composing the question bank, result store, and scoring engine.
pub struct AssessmentService<R, Q> {
    repository: Arc<R>,
    questions: Arc<Q>,
    engine: Arc<ScoringEngine>,
    config: AssessmentConfig,
}

static RESULT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_result_id() -> ResultId {
    let id = RESULT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResultId(format!("result-{id:06}"))
}

impl<R, Q> AssessmentService<R, Q>
where
    R: ResultRepository + 'static,
    Q: QuestionBank + 'static,
{
    pub fn new(
        repository: Arc<R>,
        questions: Arc<Q>,
        formulas: Arc<FormulaModel>,
        config: AssessmentConfig,
    ) -> Self {
        Self {
            repository,
            questions,
            engine: Arc::new(ScoringEngine::new(formulas)),
            config,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Open a session, creating the skeleton result on first access.
    pub fn start(
        &self,
        test_id: TestId,
        user_id: UserId,
    ) -> Result<AssessmentSession, AssessmentError> {
        let questions = self.load_questions(&test_id)?;
        let key = ResultKey::new(test_id, user_id);
        let stored = self.fetch_or_create(&key)?;
        let session = AssessmentSession::open(questions, &stored, &self.config)?;

        info!(
            %key,
            status = session.status().label(),
            page = session.page_index(),
            pages = session.page_count(),
            "assessment session opened"
        );
        Ok(session)
    }

    /// Persist the session's pending answers; on the last page also score and complete.
    ///
    /// On failure the session is left untouched so the same merge can be retried.
    pub fn continue_page(
        &self,
        session: &mut AssessmentSession,
    ) -> Result<ContinueOutcome, AssessmentError> {
        let pending = session.pending_answers();
        let finalize = session.is_last_page();
        let categories = session.categories().clone();
        let engine = Arc::clone(&self.engine);

        let stored = self.read_merge_write(session.key(), |record| {
            let changed = merge_into(record, &pending)?;
            if !finalize {
                return Ok(changed > 0);
            }
            record.scores = engine.evaluate(&record.responses, &categories);
            record.completed_at.get_or_insert_with(Utc::now);
            Ok(true)
        })?;
        session.apply_saved(&stored, &pending);

        if finalize {
            info!(key = %session.key(), traits = stored.scores.len(), "assessment completed");
            return Ok(ContinueOutcome::Completed(stored));
        }

        let page = session.advance();
        Ok(ContinueOutcome::Advanced {
            page,
            progress: session.progress_percentage(),
        })
    }

    /// Validate an untyped page payload, record it, and continue.
    pub fn submit_page(
        &self,
        session: &mut AssessmentSession,
        payload: &Value,
    ) -> Result<ContinueOutcome, AssessmentError> {
        let answers = parse_responses(payload, Some(session.questions()))?;
        session.answer_all(&answers)?;
        self.continue_page(session)
    }

    /// Merge answers into the latest stored result without a session.
    pub fn save_responses(
        &self,
        key: &ResultKey,
        answers: &ResponseMap,
    ) -> Result<TestResult, AssessmentError> {
        let questions = self.load_questions(&key.test_id)?;
        ensure_known_questions(answers, &questions)?;
        self.read_merge_write(key, |record| Ok(merge_into(record, answers)? > 0))
    }

    /// Recompute a completed result's scores with the current table and category map.
    pub fn rescore(
        &self,
        test_id: TestId,
        user_id: UserId,
    ) -> Result<TestResult, AssessmentError> {
        let questions = self.load_questions(&test_id)?;
        let categories = resolve(&questions);
        let key = ResultKey::new(test_id, user_id);
        let engine = Arc::clone(&self.engine);

        self.read_merge_write(&key, |record| {
            if record.completed_at.is_none() {
                return Err(InputViolation::NotCompleted(record.key()).into());
            }
            let scores = engine.evaluate(&record.responses, &categories);
            let changed = scores != record.scores;
            record.scores = scores;
            Ok(changed)
        })
    }

    pub fn result(&self, test_id: TestId, user_id: UserId) -> Result<TestResult, AssessmentError> {
        let key = ResultKey::new(test_id, user_id);
        self.repository
            .fetch(&key)?
            .ok_or_else(|| AssessmentError::NotFound(format!("result {key}")))
    }

    /// Percentage of the test's questions answered in the stored result.
    pub fn progress(&self, test_id: TestId, user_id: UserId) -> Result<u8, AssessmentError> {
        let questions = self.load_questions(&test_id)?;
        let stored = self.result(test_id, user_id)?;
        let answered = questions
            .iter()
            .filter(|question| stored.responses.contains_key(&question.id))
            .count();
        Ok(progress_percentage(answered, questions.len()))
    }

    fn load_questions(&self, test_id: &TestId) -> Result<Vec<Question>, AssessmentError> {
        match self.questions.questions(test_id) {
            Ok(questions) if questions.is_empty() => {
                Err(InputViolation::EmptyQuestionnaire(test_id.clone()).into())
            }
            Ok(questions) => Ok(questions),
            Err(RepositoryError::NotFound) => {
                Err(AssessmentError::NotFound(format!("test '{test_id}'")))
            }
            Err(other) => Err(other.into()),
        }
    }

    fn fetch_or_create(&self, key: &ResultKey) -> Result<TestResult, AssessmentError> {
        if let Some(existing) = self.repository.fetch(key)? {
            return Ok(existing);
        }

        let skeleton = TestResult::skeleton(next_result_id(), key.clone());
        match self.repository.insert(skeleton) {
            Ok(stored) => {
                debug!(%key, result_id = %stored.id, "created skeleton result");
                Ok(stored)
            }
            // Another session created it first.
            Err(RepositoryError::Conflict) => self
                .repository
                .fetch(key)?
                .ok_or_else(|| AssessmentError::NotFound(format!("result {key}"))),
            Err(other) => Err(other.into()),
        }
    }

    /// Apply `update` to the latest stored record and write it back, re-reading on
    /// revision conflicts. `update` returns whether a write is needed.
    fn read_merge_write<F>(&self, key: &ResultKey, mut update: F) -> Result<TestResult, AssessmentError>
    where
        F: FnMut(&mut TestResult) -> Result<bool, AssessmentError>,
    {
        let attempts = self.config.max_merge_attempts.max(1);
        for attempt in 1..=attempts {
            let mut record = self
                .repository
                .fetch(key)?
                .ok_or_else(|| AssessmentError::NotFound(format!("result {key}")))?;

            if !update(&mut record)? {
                return Ok(record);
            }

            match self.repository.update(record) {
                Ok(stored) => {
                    debug!(%key, revision = stored.revision, answered = stored.responses.len(), "result persisted");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(%key, attempt, "stale result revision, re-reading latest state");
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RepositoryError::Conflict.into())
    }
}

/// Merge answers into a record; completed results only accept identical answers.
fn merge_into(record: &mut TestResult, answers: &ResponseMap) -> Result<usize, AssessmentError> {
    if record.completed_at.is_some() {
        let differs = answers
            .iter()
            .any(|(id, value)| record.responses.get(id) != Some(value));
        if differs {
            return Err(InputViolation::SessionCompleted(record.key()).into());
        }
        return Ok(0);
    }
    Ok(merge_responses(&mut record.responses, answers))
}
