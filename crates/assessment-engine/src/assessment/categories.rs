use std::collections::BTreeMap;

use super::domain::{CategoryCode, Question, QuestionId};

/// Question → category lookup, remembering questionnaire order for the mapped questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    lookup: BTreeMap<QuestionId, Option<CategoryCode>>,
    ordered: Vec<(QuestionId, CategoryCode)>,
}

impl CategoryMap {
    pub fn get(&self, question_id: &QuestionId) -> Option<CategoryCode> {
        self.lookup.get(question_id).copied().flatten()
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.lookup.contains_key(question_id)
    }

    /// Mapped questions in questionnaire order; unmapped questions are skipped.
    pub fn mapped(&self) -> impl Iterator<Item = (&QuestionId, CategoryCode)> {
        self.ordered.iter().map(|(id, code)| (id, *code))
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Build a map from explicit pairs, treating slice order as questionnaire order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (QuestionId, Option<CategoryCode>)>,
    {
        let mut map = Self::default();
        for (question_id, code) in pairs {
            map.push(question_id, code);
        }
        map
    }

    fn push(&mut self, question_id: QuestionId, code: Option<CategoryCode>) {
        if let Some(previous) = self.lookup.insert(question_id.clone(), code) {
            if previous.is_some() {
                self.ordered.retain(|(id, _)| id != &question_id);
            }
        }
        if let Some(code) = code {
            self.ordered.push((question_id, code));
        }
    }
}

/// Resolve every question to its input variable code.
///
/// Questions are taken in `order_index` order (ties by id) so the variable vector fold is
/// reproducible no matter how the caller ordered the slice.
pub fn resolve(questions: &[Question]) -> CategoryMap {
    let mut sorted: Vec<&Question> = questions.iter().collect();
    sorted.sort_by(|left, right| {
        left.order_index
            .cmp(&right.order_index)
            .then_with(|| left.id.cmp(&right.id))
    });

    CategoryMap::from_pairs(
        sorted
            .into_iter()
            .map(|question| (question.id.clone(), question.category_code)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::domain::{Domain, TestId};

    fn question(id: &str, order_index: u32, code: Option<&str>) -> Question {
        Question {
            id: QuestionId::from(id),
            test_id: TestId::from("neo"),
            category_code: code.map(|raw| raw.parse().expect("valid code")),
            order_index,
            text: format!("statement {id}"),
        }
    }

    #[test]
    fn resolves_codes_and_keeps_unmapped_questions_unmapped() {
        let questions = vec![
            question("q-2", 2, None),
            question("q-1", 1, Some("A1")),
        ];

        let map = resolve(&questions);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get(&QuestionId::from("q-1")),
            Some(CategoryCode::new(Domain::Amiability, 1))
        );
        assert!(map.contains(&QuestionId::from("q-2")));
        assert_eq!(map.get(&QuestionId::from("q-2")), None);
        assert_eq!(map.mapped().count(), 1);
    }

    #[test]
    fn mapped_iterates_in_questionnaire_order() {
        let questions = vec![
            question("q-b", 3, Some("E2")),
            question("q-a", 1, Some("E2")),
            question("q-c", 2, Some("O5")),
        ];

        let map = resolve(&questions);
        let order: Vec<&str> = map.mapped().map(|(id, _)| id.0.as_str()).collect();

        assert_eq!(order, vec!["q-a", "q-c", "q-b"]);
    }

    #[test]
    fn unknown_question_resolves_to_nothing() {
        let map = resolve(&[question("q-1", 1, Some("C3"))]);
        assert_eq!(map.get(&QuestionId::from("missing")), None);
        assert!(!map.contains(&QuestionId::from("missing")));
    }
}
