use std::collections::BTreeSet;

use super::categories::{resolve, CategoryMap};
use super::domain::{
    LikertValue, Question, QuestionId, ResponseMap, ResultKey, SessionStatus, TestResult,
};
use super::intake::InputViolation;
use crate::config::{AssessmentConfig, ResumePolicy};

/// Where backward navigation leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Page(usize),
    /// Backing out of the first page leaves the session.
    Exit,
}

/// Paginated, in-memory view of one user's pass through a test.
///
/// Holds a working copy of the responses: the stored answers plus anything answered here and
/// not yet persisted. Persistence is driven by `AssessmentService`.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    key: ResultKey,
    questions: Vec<Question>,
    categories: CategoryMap,
    page_size: usize,
    page: usize,
    responses: ResponseMap,
    unsaved: BTreeSet<QuestionId>,
    status: SessionStatus,
}

impl AssessmentSession {
    pub fn open(
        mut questions: Vec<Question>,
        stored: &TestResult,
        config: &AssessmentConfig,
    ) -> Result<Self, InputViolation> {
        if questions.is_empty() {
            return Err(InputViolation::EmptyQuestionnaire(stored.test_id.clone()));
        }

        questions.sort_by(|left, right| {
            left.order_index
                .cmp(&right.order_index)
                .then_with(|| left.id.cmp(&right.id))
        });
        let categories = resolve(&questions);

        let mut session = Self {
            key: stored.key(),
            questions,
            categories,
            page_size: config.page_size.max(1),
            page: 0,
            responses: stored.responses.clone(),
            unsaved: BTreeSet::new(),
            status: stored.status(),
        };

        if config.resume_policy == ResumePolicy::FirstUnanswered {
            session.page = session.first_unanswered_page();
        }

        Ok(session)
    }

    pub fn key(&self) -> &ResultKey {
        &self.key
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn page_index(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.questions.len().div_ceil(self.page_size)
    }

    pub fn is_last_page(&self) -> bool {
        self.page + 1 >= self.page_count()
    }

    pub fn current_page(&self) -> &[Question] {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.questions.len());
        &self.questions[start..end]
    }

    /// Working responses: stored answers overlaid with unsaved ones.
    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    pub fn answer(
        &mut self,
        question_id: &QuestionId,
        value: LikertValue,
    ) -> Result<(), InputViolation> {
        self.ensure_open()?;
        if !self.categories.contains(question_id) {
            return Err(InputViolation::UnknownQuestion(question_id.clone()));
        }
        self.responses.insert(question_id.clone(), value);
        self.unsaved.insert(question_id.clone());
        Ok(())
    }

    /// Record a whole page of answers, or none of them.
    pub fn answer_all(&mut self, answers: &ResponseMap) -> Result<(), InputViolation> {
        self.ensure_open()?;
        if let Some(unknown) = answers.keys().find(|id| !self.categories.contains(id)) {
            return Err(InputViolation::UnknownQuestion(unknown.clone()));
        }
        for (question_id, value) in answers {
            self.answer(question_id, *value)?;
        }
        Ok(())
    }

    /// Answers recorded in this session that have not been persisted yet.
    pub fn pending_answers(&self) -> ResponseMap {
        self.unsaved
            .iter()
            .filter_map(|id| self.responses.get(id).map(|value| (id.clone(), *value)))
            .collect()
    }

    pub fn has_pending_answers(&self) -> bool {
        !self.unsaved.is_empty()
    }

    /// Step back one page. Nothing is persisted.
    pub fn back(&mut self) -> Navigation {
        if self.page == 0 {
            Navigation::Exit
        } else {
            self.page -= 1;
            Navigation::Page(self.page)
        }
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| self.responses.contains_key(&question.id))
            .count()
    }

    pub fn progress_percentage(&self) -> u8 {
        progress_percentage(self.answered_count(), self.questions.len())
    }

    /// Adopt the freshly stored record after `saved` was persisted.
    pub(crate) fn apply_saved(&mut self, stored: &TestResult, saved: &ResponseMap) {
        for question_id in saved.keys() {
            self.unsaved.remove(question_id);
        }

        let mut responses = stored.responses.clone();
        for question_id in &self.unsaved {
            if let Some(value) = self.responses.get(question_id) {
                responses.insert(question_id.clone(), *value);
            }
        }
        self.responses = responses;
        self.status = stored.status();
    }

    /// Move to the next page, staying put on the last one.
    pub(crate) fn advance(&mut self) -> usize {
        if !self.is_last_page() {
            self.page += 1;
        }
        self.page
    }

    fn ensure_open(&self) -> Result<(), InputViolation> {
        if self.status == SessionStatus::Completed {
            return Err(InputViolation::SessionCompleted(self.key.clone()));
        }
        Ok(())
    }

    fn first_unanswered_page(&self) -> usize {
        self.questions
            .iter()
            .position(|question| !self.responses.contains_key(&question.id))
            .map(|index| index / self.page_size)
            .unwrap_or_else(|| self.page_count().saturating_sub(1))
    }
}

/// `round(100 * answered / total)`, or 0 for an empty questionnaire.
pub fn progress_percentage(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = answered.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}
