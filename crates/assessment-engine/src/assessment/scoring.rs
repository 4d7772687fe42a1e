use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::categories::{resolve, CategoryMap};
use super::domain::{
    CategoryCode, Domain, LikertValue, Question, ResponseMap, TraitScores, NEUTRAL_VALUE,
};
use super::formulas::{FormulaModel, TraitFormula};
use super::intake::parse_responses;
use super::AssessmentError;

/// Answer per category code after folding responses through the category map.
pub type VariableVector = BTreeMap<CategoryCode, LikertValue>;

/// Fold responses into category variables, walking questions in questionnaire order so the
/// later of two questions sharing a code wins.
pub fn variable_vector(responses: &ResponseMap, categories: &CategoryMap) -> VariableVector {
    let mut variables = VariableVector::new();
    for (question_id, code) in categories.mapped() {
        if let Some(value) = responses.get(question_id) {
            variables.insert(code, *value);
        }
    }
    variables
}

/// Score every formula. Codes without an answer read as the neutral value.
pub fn evaluate(
    responses: &ResponseMap,
    categories: &CategoryMap,
    formulas: &FormulaModel,
) -> TraitScores {
    let variables = variable_vector(responses, categories);
    formulas
        .formulas()
        .iter()
        .map(|formula| {
            let scored = score_formula(formula, &variables);
            (scored.trait_name, scored.score)
        })
        .collect()
}

/// Per-trait scoring detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    pub trait_name: String,
    pub facet: CategoryCode,
    pub raw: f64,
    pub normalized: f64,
    pub score: u8,
}

/// Full scoring output: facet detail plus rounded per-domain means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub traits: Vec<TraitScore>,
    pub domains: BTreeMap<Domain, u8>,
}

impl ScoreReport {
    pub fn scores(&self) -> TraitScores {
        self.traits
            .iter()
            .map(|score| (score.trait_name.clone(), score.score))
            .collect()
    }
}

fn score_formula(formula: &TraitFormula, variables: &VariableVector) -> TraitScore {
    let raw: f64 = formula
        .terms
        .iter()
        .map(|term| {
            let value = variables.get(&term.code).copied().unwrap_or(NEUTRAL_VALUE);
            term.contribution(value)
        })
        .sum();
    let normalized = raw / formula.denominator;

    TraitScore {
        trait_name: formula.trait_name.clone(),
        facet: formula.facet,
        raw,
        normalized,
        score: to_percent(normalized, &formula.trait_name),
    }
}

fn to_percent(normalized: f64, trait_name: &str) -> u8 {
    if !normalized.is_finite() {
        tracing::warn!(trait_name, "non-finite normalized score, reporting 0");
        return 0;
    }
    (normalized * 100.0).round().clamp(0.0, 100.0) as u8
}

fn domain_means(traits: &[TraitScore]) -> BTreeMap<Domain, u8> {
    let mut totals: BTreeMap<Domain, (u32, u32)> = BTreeMap::new();
    for score in traits {
        let entry = totals.entry(score.facet.domain()).or_insert((0, 0));
        entry.0 += u32::from(score.score);
        entry.1 += 1;
    }

    totals
        .into_iter()
        .map(|(domain, (sum, count))| {
            let mean = (f64::from(sum) / f64::from(count)).round() as u8;
            (domain, mean)
        })
        .collect()
}

/// Stateless evaluator over a shared formula table.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    formulas: Arc<FormulaModel>,
}

impl ScoringEngine {
    pub fn new(formulas: Arc<FormulaModel>) -> Self {
        Self { formulas }
    }

    pub fn standard() -> Self {
        Self::new(FormulaModel::standard())
    }

    pub fn formulas(&self) -> &FormulaModel {
        &self.formulas
    }

    pub fn evaluate(&self, responses: &ResponseMap, categories: &CategoryMap) -> TraitScores {
        evaluate(responses, categories, &self.formulas)
    }

    pub fn report(&self, responses: &ResponseMap, categories: &CategoryMap) -> ScoreReport {
        let variables = variable_vector(responses, categories);
        let traits: Vec<TraitScore> = self
            .formulas
            .formulas()
            .iter()
            .map(|formula| score_formula(formula, &variables))
            .collect();
        let domains = domain_means(&traits);
        ScoreReport { traits, domains }
    }

    /// Validate an untyped payload against `questions`, then score it.
    pub fn evaluate_raw(
        &self,
        payload: &Value,
        questions: &[Question],
    ) -> Result<TraitScores, AssessmentError> {
        let responses = parse_responses(payload, Some(questions))?;
        Ok(self.evaluate(&responses, &resolve(questions)))
    }
}
