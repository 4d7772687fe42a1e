use crate::infra::{load_formulas, print_json};
use assessment_engine::assessment::memory::DEMO_TEST_ID;
use assessment_engine::assessment::{
    resolve, AssessmentError, AssessmentService, AssessmentSession, ContinueOutcome,
    InMemoryQuestionBank, InMemoryResultRepository, LikertValue, QuestionBank, TestId, TestResult,
    UserId,
};
use assessment_engine::config::AppConfig;
use assessment_engine::error::AppError;
use chrono::Utc;
use clap::Args;
use std::sync::Arc;
use tracing::info;

type DemoService = AssessmentService<InMemoryResultRepository, InMemoryQuestionBank>;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of pages answered before the first session is abandoned
    #[arg(long, default_value_t = 3)]
    pub(crate) split: usize,
    /// Respondent id. Defaults to a timestamped demo user.
    #[arg(long)]
    pub(crate) user: Option<String>,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let questions = Arc::new(InMemoryQuestionBank::demo());
    let service = AssessmentService::new(
        Arc::new(InMemoryResultRepository::default()),
        questions.clone(),
        load_formulas(config.assessment.formula_path.as_deref())?,
        config.assessment.clone(),
    );
    let test_id = TestId::from(DEMO_TEST_ID);
    let user_id = args
        .user
        .map(UserId)
        .unwrap_or_else(|| UserId(Utc::now().format("demo-%Y%m%d%H%M%S").to_string()));

    println!("== first session ({test_id} for {user_id}) ==");
    let mut first = service.start(test_id.clone(), user_id.clone())?;
    for _ in 0..args.split.min(first.page_count().saturating_sub(1)) {
        answer_open_questions(&mut first);
        take_step(&service, &mut first)?;
    }
    println!("session abandoned on page {}", first.page_index() + 1);
    drop(first);

    println!("== second session ==");
    let mut second = service.start(test_id.clone(), user_id.clone())?;
    println!(
        "resumed on page {} of {} with {} saved answers",
        second.page_index() + 1,
        second.page_count(),
        second.answered_count()
    );
    let result = loop {
        answer_open_questions(&mut second);
        if let Some(result) = take_step(&service, &mut second)? {
            break result;
        }
    };

    let categories = resolve(
        &questions
            .questions(&test_id)
            .map_err(AssessmentError::from)?,
    );
    let report = service.engine().report(&result.responses, &categories);
    info!(user = %user_id, traits = report.traits.len(), "demo completed");

    if let Some(completed_at) = result.completed_at {
        println!("completed at {}", completed_at.to_rfc3339());
    }
    print_json(&report.domains)?;
    print_json(&result.status_view())
}

fn take_step(
    service: &DemoService,
    session: &mut AssessmentSession,
) -> Result<Option<TestResult>, AppError> {
    match service.continue_page(session)? {
        ContinueOutcome::Advanced { page, progress } => {
            println!("saved, now on page {} ({progress}% answered)", page + 1);
            Ok(None)
        }
        ContinueOutcome::Completed(result) => Ok(Some(result)),
    }
}

/// Fill unanswered questions on the current page with a repeating 1-5 pattern.
fn answer_open_questions(session: &mut AssessmentSession) {
    let open: Vec<_> = session
        .current_page()
        .iter()
        .filter(|question| !session.responses().contains_key(&question.id))
        .map(|question| (question.id.clone(), question.order_index))
        .collect();

    for (question_id, order_index) in open {
        let Ok(value) = LikertValue::try_from(i64::from(order_index % 5 + 1)) else {
            continue;
        };
        if let Err(err) = session.answer(&question_id, value) {
            println!("skipped {question_id}: {err}");
        }
    }
}
