use crate::demo::{run_demo, DemoArgs};
use crate::infra::{load_formulas, print_json};
use crate::score::{run_score, ScoreArgs};
use assessment_engine::config::AppConfig;
use assessment_engine::error::AppError;
use assessment_engine::telemetry;
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "Assessment Engine",
    about = "Score Big Five questionnaires and walk through a resumable test session",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a response file against a question file
    Score(ScoreArgs),
    /// Take the built-in questionnaire across two sessions
    Demo(DemoArgs),
    /// Print the active formula table as JSON
    Formulas,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Score(args) => run_score(args, &config),
        Command::Demo(args) => run_demo(args, &config),
        Command::Formulas => {
            let formulas = load_formulas(config.assessment.formula_path.as_deref())?;
            print_json(&*formulas)
        }
    }
}
