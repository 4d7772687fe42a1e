//! Declarative trait formulas: weighted linear combinations of category variables.

mod table;

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::domain::{CategoryCode, Domain, LikertValue, LIKERT_MAX};

/// Signed, weighted contribution of one variable code to a trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaTerm {
    pub code: CategoryCode,
    pub weight: f64,
    #[serde(default)]
    pub inverted: bool,
}

impl FormulaTerm {
    pub fn contribution(&self, value: LikertValue) -> f64 {
        let keyed = if self.inverted {
            value.inverted()
        } else {
            value.get()
        };
        self.weight * f64::from(keyed)
    }
}

/// One facet's formula. `denominator` is fixed data, never derived at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitFormula {
    pub trait_name: String,
    pub facet: CategoryCode,
    pub terms: Vec<FormulaTerm>,
    pub denominator: f64,
}

impl TraitFormula {
    pub fn domain(&self) -> Domain {
        self.facet.domain()
    }

    /// Largest raw value the terms can reach on a 1–5 scale.
    pub fn max_raw(&self) -> f64 {
        self.terms
            .iter()
            .map(|term| term.weight.max(0.0) * f64::from(LIKERT_MAX))
            .sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormulaError {
    #[error("formula table is empty")]
    Empty,
    #[error("trait '{0}' is defined more than once")]
    DuplicateTrait(String),
    #[error("trait '{0}' has no terms")]
    NoTerms(String),
    #[error("trait '{trait_name}' has a non-finite weight for {code}")]
    InvalidWeight {
        trait_name: String,
        code: CategoryCode,
    },
    #[error("trait '{trait_name}' needs a finite, positive denominator (found {denominator})")]
    InvalidDenominator { trait_name: String, denominator: f64 },
    #[error("formula table is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unable to read formula table {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Immutable table of trait formulas, shared read-only across evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormulaModel {
    formulas: Vec<TraitFormula>,
}

impl FormulaModel {
    pub fn new(formulas: Vec<TraitFormula>) -> Result<Self, FormulaError> {
        if formulas.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut names = HashSet::new();
        for formula in &formulas {
            if !names.insert(formula.trait_name.as_str()) {
                return Err(FormulaError::DuplicateTrait(formula.trait_name.clone()));
            }
            if formula.terms.is_empty() {
                return Err(FormulaError::NoTerms(formula.trait_name.clone()));
            }
            if let Some(term) = formula.terms.iter().find(|term| !term.weight.is_finite()) {
                return Err(FormulaError::InvalidWeight {
                    trait_name: formula.trait_name.clone(),
                    code: term.code,
                });
            }
            if !formula.denominator.is_finite() || formula.denominator <= 0.0 {
                return Err(FormulaError::InvalidDenominator {
                    trait_name: formula.trait_name.clone(),
                    denominator: formula.denominator,
                });
            }
        }

        Ok(Self { formulas })
    }

    /// The built-in thirty-facet table, built once per process.
    pub fn standard() -> Arc<FormulaModel> {
        static STANDARD: OnceLock<Arc<FormulaModel>> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                Arc::new(FormulaModel {
                    formulas: table::standard_formulas(),
                })
            })
            .clone()
    }

    pub fn from_json(raw: &str) -> Result<Self, FormulaError> {
        let formulas: Vec<TraitFormula> = serde_json::from_str(raw)?;
        Self::new(formulas)
    }

    pub fn load(path: &Path) -> Result<Self, FormulaError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FormulaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn formulas(&self) -> &[TraitFormula] {
        &self.formulas
    }

    pub fn get(&self, trait_name: &str) -> Option<&TraitFormula> {
        self.formulas
            .iter()
            .find(|formula| formula.trait_name == trait_name)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Every code read by at least one formula.
    pub fn referenced_codes(&self) -> BTreeSet<CategoryCode> {
        self.formulas
            .iter()
            .flat_map(|formula| formula.terms.iter().map(|term| term.code))
            .collect()
    }
}
