//! Mutex-guarded reference adapters for the store traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{CategoryCode, Question, QuestionId, ResultKey, TestId, TestResult};
use super::repository::{QuestionBank, RepositoryError, ResultRepository};

#[derive(Default, Clone)]
pub struct InMemoryResultRepository {
    records: Arc<Mutex<HashMap<ResultKey, TestResult>>>,
}

impl InMemoryResultRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ResultKey, TestResult>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("result store lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultRepository for InMemoryResultRepository {
    fn insert(&self, record: TestResult) -> Result<TestResult, RepositoryError> {
        let mut guard = self.lock()?;
        let key = record.key();
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, mut record: TestResult) -> Result<TestResult, RepositoryError> {
        let mut guard = self.lock()?;
        let key = record.key();
        let stored = guard.get(&key).ok_or(RepositoryError::NotFound)?;
        if stored.revision != record.revision {
            return Err(RepositoryError::Conflict);
        }
        record.revision += 1;
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn fetch(&self, key: &ResultKey) -> Result<Option<TestResult>, RepositoryError> {
        Ok(self.lock()?.get(key).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryQuestionBank {
    tests: Arc<Mutex<HashMap<TestId, Vec<Question>>>>,
}

pub const DEMO_TEST_ID: &str = "big-five-demo";

const DEMO_STATEMENTS: [&str; 30] = [
    "I assume people I meet have good intentions.",
    "I say what I mean, even when it is awkward.",
    "I go out of my way to help colleagues.",
    "I give in rather than argue.",
    "I do not like to talk about my achievements.",
    "Other people's hardship moves me.",
    "I handle tasks well under pressure.",
    "I keep my workspace tidy.",
    "I keep promises even when inconvenient.",
    "I set ambitious goals for myself.",
    "I finish what I start.",
    "I think things through before acting.",
    "I warm up to people quickly.",
    "I enjoy large gatherings.",
    "I take charge in group settings.",
    "I keep a fast pace.",
    "I seek out thrilling experiences.",
    "I often feel cheerful.",
    "I worry about things going wrong.",
    "I get irritated easily.",
    "I often feel discouraged.",
    "I feel uneasy when others watch me.",
    "I act on cravings I later regret.",
    "I struggle when things go badly at once.",
    "I often daydream.",
    "I am moved by art and music.",
    "I notice my moods clearly.",
    "I like trying unfamiliar routines.",
    "I enjoy abstract puzzles.",
    "I question established conventions.",
];

impl InMemoryQuestionBank {
    pub fn with_test(self, test_id: TestId, questions: Vec<Question>) -> Self {
        if let Ok(mut guard) = self.tests.lock() {
            guard.insert(test_id, questions);
        }
        self
    }

    /// Thirty-statement questionnaire, one question per category code.
    pub fn demo() -> Self {
        Self::default().with_test(TestId::from(DEMO_TEST_ID), demo_questions())
    }
}

pub fn demo_questions() -> Vec<Question> {
    CategoryCode::all()
        .zip(DEMO_STATEMENTS)
        .enumerate()
        .map(|(index, (code, text))| Question {
            id: QuestionId(format!("q-{code}")),
            test_id: TestId::from(DEMO_TEST_ID),
            category_code: Some(code),
            order_index: index as u32 + 1,
            text: text.to_string(),
        })
        .collect()
}

impl QuestionBank for InMemoryQuestionBank {
    fn questions(&self, test_id: &TestId) -> Result<Vec<Question>, RepositoryError> {
        let guard = self
            .tests
            .lock()
            .map_err(|_| RepositoryError::Unavailable("question bank lock poisoned".to_string()))?;
        guard.get(test_id).cloned().ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::{ResultId, UserId};

    fn skeleton() -> TestResult {
        TestResult::skeleton(
            ResultId("result-1".to_string()),
            ResultKey::new(TestId::from(DEMO_TEST_ID), UserId::from("u-1")),
        )
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let repository = InMemoryResultRepository::default();
        repository.insert(skeleton()).expect("first insert");
        assert_eq!(
            repository.insert(skeleton()),
            Err(RepositoryError::Conflict)
        );
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn update_bumps_revision_and_rejects_stale_writes() {
        let repository = InMemoryResultRepository::default();
        let stored = repository.insert(skeleton()).expect("insert");

        let updated = repository.update(stored.clone()).expect("fresh update");
        assert_eq!(updated.revision, 1);

        assert_eq!(repository.update(stored), Err(RepositoryError::Conflict));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let repository = InMemoryResultRepository::default();
        assert_eq!(
            repository.update(skeleton()),
            Err(RepositoryError::NotFound)
        );
    }

    #[test]
    fn demo_bank_serves_one_question_per_code() {
        let bank = InMemoryQuestionBank::demo();
        let questions = bank
            .questions(&TestId::from(DEMO_TEST_ID))
            .expect("demo test present");
        assert_eq!(questions.len(), 30);
        assert!(questions.iter().all(|question| question.category_code.is_some()));
        assert_eq!(
            bank.questions(&TestId::from("unknown")),
            Err(RepositoryError::NotFound)
        );
    }
}
