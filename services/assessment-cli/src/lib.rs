mod cli;
mod demo;
mod infra;
mod score;

use assessment_engine::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
