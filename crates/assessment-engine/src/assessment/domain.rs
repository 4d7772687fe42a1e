use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for questionnaire items.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Identifier wrapper for a questionnaire definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestId(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier of a persisted test result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub String);

macro_rules! display_inner {
    ($($id:ty),+) => {
        $(impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })+
    };
}

display_inner!(QuestionId, TestId, UserId, ResultId);

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for TestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The five top-level personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    Amiability,
    Conscientiousness,
    Extraversion,
    Neuroticism,
    Openness,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Amiability,
        Domain::Conscientiousness,
        Domain::Extraversion,
        Domain::Neuroticism,
        Domain::Openness,
    ];

    pub const fn letter(self) -> char {
        match self {
            Domain::Amiability => 'A',
            Domain::Conscientiousness => 'C',
            Domain::Extraversion => 'E',
            Domain::Neuroticism => 'N',
            Domain::Openness => 'O',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Domain::Amiability),
            'C' => Some(Domain::Conscientiousness),
            'E' => Some(Domain::Extraversion),
            'N' => Some(Domain::Neuroticism),
            'O' => Some(Domain::Openness),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Domain::Amiability => "amiability",
            Domain::Conscientiousness => "conscientiousness",
            Domain::Extraversion => "extraversion",
            Domain::Neuroticism => "neuroticism",
            Domain::Openness => "openness",
        }
    }
}

pub const FACETS_PER_DOMAIN: u8 = 6;

/// Binds a question to a formula input variable: domain letter plus facet number (`"A1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryCode {
    domain: Domain,
    facet: u8,
}

impl CategoryCode {
    /// Callers must pass a facet in `1..=6`; parsed codes are checked.
    pub(crate) const fn new(domain: Domain, facet: u8) -> Self {
        Self { domain, facet }
    }

    pub fn try_new(domain: Domain, facet: u8) -> Result<Self, InvalidCategoryCode> {
        if (1..=FACETS_PER_DOMAIN).contains(&facet) {
            Ok(Self::new(domain, facet))
        } else {
            Err(InvalidCategoryCode(format!("{}{}", domain.letter(), facet)))
        }
    }

    pub const fn domain(self) -> Domain {
        self.domain
    }

    pub const fn facet(self) -> u8 {
        self.facet
    }

    /// All thirty codes, domain-major.
    pub fn all() -> impl Iterator<Item = CategoryCode> {
        Domain::ALL.into_iter().flat_map(|domain| {
            (1..=FACETS_PER_DOMAIN).map(move |facet| CategoryCode::new(domain, facet))
        })
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.domain.letter(), self.facet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category code '{0}'")]
pub struct InvalidCategoryCode(pub String);

impl FromStr for CategoryCode {
    type Err = InvalidCategoryCode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        let domain = chars.next().and_then(Domain::from_letter);
        let facet = chars.as_str().parse::<u8>().ok();

        match (domain, facet) {
            (Some(domain), Some(facet)) => Self::try_new(domain, facet)
                .map_err(|_| InvalidCategoryCode(trimmed.to_string())),
            _ => Err(InvalidCategoryCode(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for CategoryCode {
    type Error = InvalidCategoryCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryCode> for String {
    fn from(value: CategoryCode) -> Self {
        value.to_string()
    }
}

/// A single answer on the 1–5 Likert scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct LikertValue(u8);

pub const LIKERT_MIN: u8 = 1;
pub const LIKERT_MAX: u8 = 5;
/// Substituted for any formula input without an answered question.
pub const NEUTRAL_VALUE: LikertValue = LikertValue(3);

impl LikertValue {
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Reverse-scored value for negatively keyed items (1↔5, 2↔4, 3↔3).
    pub const fn inverted(self) -> u8 {
        LIKERT_MIN + LIKERT_MAX - self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("likert value {0} outside 1..=5")]
pub struct LikertOutOfRange(pub i64);

impl TryFrom<i64> for LikertValue {
    type Error = LikertOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(LIKERT_MIN)..=i64::from(LIKERT_MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LikertOutOfRange(value))
        }
    }
}

impl From<LikertValue> for u8 {
    fn from(value: LikertValue) -> Self {
        value.0
    }
}

/// Questionnaire item as supplied by the surrounding system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub test_id: TestId,
    #[serde(default, deserialize_with = "deserialize_category")]
    pub category_code: Option<CategoryCode>,
    pub order_index: u32,
    #[serde(alias = "question_text")]
    pub text: String,
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<Option<CategoryCode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => code.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Answers keyed by question; built incrementally across sessions.
pub type ResponseMap = BTreeMap<QuestionId, LikertValue>;

/// Normalized 0–100 score per trait name.
pub type TraitScores = BTreeMap<String, u8>;

/// Overwrite `target` with every answer in `page`, returning how many entries changed.
///
/// Merging the same page twice leaves the map as the first merge did.
pub fn merge_responses(target: &mut ResponseMap, page: &ResponseMap) -> usize {
    let mut changed = 0;
    for (question_id, value) in page {
        if target.insert(question_id.clone(), *value) != Some(*value) {
            changed += 1;
        }
    }
    changed
}

/// Address of a stored result: one per test and user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    pub test_id: TestId,
    pub user_id: UserId,
}

impl ResultKey {
    pub fn new(test_id: TestId, user_id: UserId) -> Self {
        Self { test_id, user_id }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.test_id, self.user_id)
    }
}

/// Persisted progress and outcome of one user taking one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ResultId,
    pub test_id: TestId,
    pub user_id: UserId,
    #[serde(default)]
    pub responses: ResponseMap,
    #[serde(default)]
    pub scores: TraitScores,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every successful update.
    #[serde(default)]
    pub revision: u64,
}

impl TestResult {
    /// Empty record created on a user's first access to a test.
    pub fn skeleton(id: ResultId, key: ResultKey) -> Self {
        Self {
            id,
            test_id: key.test_id,
            user_id: key.user_id,
            responses: ResponseMap::new(),
            scores: TraitScores::new(),
            completed_at: None,
            revision: 0,
        }
    }

    pub fn key(&self) -> ResultKey {
        ResultKey::new(self.test_id.clone(), self.user_id.clone())
    }

    pub fn status(&self) -> SessionStatus {
        if self.completed_at.is_some() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        }
    }

    pub fn status_view(&self) -> TestResultView {
        let completed = self.completed_at.is_some();
        TestResultView {
            test_id: self.test_id.clone(),
            user_id: self.user_id.clone(),
            status: self.status().label(),
            answered: self.responses.len(),
            completed_at: self.completed_at,
            scores: completed.then(|| self.scores.clone()),
        }
    }
}

/// Lifecycle of a user's pass through a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

/// Sanitized representation of a result's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct TestResultView {
    pub test_id: TestId,
    pub user_id: UserId,
    pub status: &'static str,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<TraitScores>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_round_trip_through_strings() {
        let code: CategoryCode = "n4".parse().expect("lowercase code parses");
        assert_eq!(code.domain(), Domain::Neuroticism);
        assert_eq!(code.facet(), 4);
        assert_eq!(code.to_string(), "N4");
    }

    #[test]
    fn rejects_codes_outside_the_thirty() {
        for raw in ["A0", "A7", "X1", "", "C", "E12"] {
            assert!(raw.parse::<CategoryCode>().is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn all_yields_thirty_distinct_codes() {
        let codes: std::collections::BTreeSet<_> = CategoryCode::all().collect();
        assert_eq!(codes.len(), 30);
    }

    #[test]
    fn likert_inversion_maps_scale_ends() {
        let values: Vec<u8> = (1..=5)
            .map(|raw| LikertValue::try_from(raw).expect("in range").inverted())
            .collect();
        assert_eq!(values, vec![5, 4, 3, 2, 1]);
        assert!(LikertValue::try_from(0).is_err());
        assert!(LikertValue::try_from(6).is_err());
    }

    #[test]
    fn question_with_blank_category_is_unmapped() {
        let question: Question = serde_json::from_value(serde_json::json!({
            "id": "q-1",
            "category_code": "  ",
            "order_index": 1,
            "question_text": "I enjoy meeting new people."
        }))
        .expect("question deserializes");
        assert_eq!(question.category_code, None);
        assert_eq!(question.text, "I enjoy meeting new people.");
    }

    #[test]
    fn question_with_unknown_category_fails() {
        let result: Result<Question, _> = serde_json::from_value(serde_json::json!({
            "id": "q-1",
            "category_code": "Z9",
            "order_index": 1,
            "text": "?"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn merge_overwrites_instead_of_accumulating() {
        let mut target = ResponseMap::new();
        let mut page = ResponseMap::new();
        page.insert(QuestionId::from("q-1"), LikertValue(4));
        page.insert(QuestionId::from("q-2"), LikertValue(2));

        assert_eq!(merge_responses(&mut target, &page), 2);
        assert_eq!(merge_responses(&mut target, &page), 0);
        assert_eq!(target, page);
    }

    #[test]
    fn status_view_hides_scores_until_completed() {
        let key = ResultKey::new(TestId::from("neo"), UserId::from("u-1"));
        let mut result = TestResult::skeleton(ResultId("result-1".to_string()), key);
        result.scores.insert("trust".to_string(), 70);
        assert_eq!(result.status_view().status, "in_progress");
        assert!(result.status_view().scores.is_none());

        result.completed_at = Some(Utc::now());
        let view = result.status_view();
        assert_eq!(view.status, "completed");
        assert_eq!(view.scores.expect("scores exposed").get("trust"), Some(&70));
    }
}
