use assessment_engine::assessment::{AssessmentError, FormulaModel, Question};
use assessment_engine::error::AppError;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Formula table from `path`, or the built-in table when no path is configured.
pub(crate) fn load_formulas(path: Option<&Path>) -> Result<Arc<FormulaModel>, AppError> {
    match path {
        Some(path) => {
            let model = FormulaModel::load(path).map_err(AssessmentError::from)?;
            info!(path = %path.display(), traits = model.len(), "loaded formula table");
            Ok(Arc::new(model))
        }
        None => Ok(FormulaModel::standard()),
    }
}

pub(crate) fn read_questions(path: &Path) -> Result<Vec<Question>, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn read_payload(path: &Path) -> Result<Value, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
