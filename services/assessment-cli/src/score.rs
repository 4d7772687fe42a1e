use crate::infra::{load_formulas, print_json, read_payload, read_questions};
use assessment_engine::assessment::{parse_responses, resolve, AssessmentError, ScoringEngine};
use assessment_engine::config::AppConfig;
use assessment_engine::error::AppError;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON array of questions (id, category_code, order_index, text)
    #[arg(long)]
    pub(crate) questions: PathBuf,
    /// JSON object mapping question ids to answers 1-5
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Formula table overriding ASSESSMENT_FORMULA_PATH and the built-in table
    #[arg(long)]
    pub(crate) formulas: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs, config: &AppConfig) -> Result<(), AppError> {
    let formula_path = args
        .formulas
        .as_deref()
        .or(config.assessment.formula_path.as_deref());
    let engine = ScoringEngine::new(load_formulas(formula_path)?);

    let questions = read_questions(&args.questions)?;
    let payload = read_payload(&args.responses)?;
    let responses =
        parse_responses(&payload, Some(&questions)).map_err(AssessmentError::from)?;
    let categories = resolve(&questions);

    let report = engine.report(&responses, &categories);
    info!(
        questions = questions.len(),
        answered = responses.len(),
        mapped = categories.mapped().count(),
        traits = report.traits.len(),
        "scored response file"
    );
    print_json(&report)
}
