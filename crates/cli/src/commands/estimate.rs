use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use stackwise_core::config::AppConfig;
use stackwise_core::{
    format_currency, format_currency_k, DetailedBudget, DiscountOutcome, EstimationSession,
    EstimationType, QuestionCatalog, QuickEstimate, Recommendation,
};
use stackwise_db::{ProfileRepository, SqlProfileRepository};
use tracing::info;

use crate::commands::input::{unanswered_questions, EstimateInput};
use crate::commands::{load_config, repository_failure, with_pool, CommandResult, Failure};
use crate::commands::{EXIT_CONFIG, EXIT_INPUT};

#[derive(Debug, Serialize)]
pub struct EstimateSummary {
    pub project_name: String,
    pub estimation_type: EstimationType,
    pub recommendation: Recommendation,
    pub average_days: i64,
    pub quick: QuickEstimate,
    pub detailed: DetailedBudget,
    pub discount: DiscountOutcome,
    pub display: DisplayAmounts,
}

#[derive(Debug, Serialize)]
pub struct DisplayAmounts {
    pub quick_range: String,
    pub total_budget: String,
    pub final_budget: String,
    pub final_budget_short: String,
}

pub fn run(input_path: &Path) -> CommandResult {
    match estimate(input_path) {
        Ok(summary) => {
            let message = format!(
                "stack {} for {} days, {} after discount",
                summary.recommendation.stack,
                summary.average_days,
                summary.display.final_budget
            );
            CommandResult::success_with_data("estimate", message, summary)
        }
        Err(failure) => CommandResult::from_failure("estimate", failure),
    }
}

fn estimate(input_path: &Path) -> Result<EstimateSummary, Failure> {
    let config = load_config()?;
    let input = EstimateInput::read(input_path)?;
    let session = load_session(&config, input)?;
    summarize(&session)
}

/// Builds a session from the request and the stored profile grid.
fn load_session(
    config: &AppConfig,
    input: EstimateInput,
) -> Result<EstimationSession, Failure> {
    let catalog = question_catalog(config)?;
    let profiles = with_pool(config, |pool| async move {
        SqlProfileRepository::new(pool).list().await.map_err(repository_failure)
    })?;

    input.into_session(catalog, profiles)
}

pub(crate) fn question_catalog(config: &AppConfig) -> Result<QuestionCatalog, Failure> {
    config
        .question_catalog()
        .map_err(|error| ("catalog", format!("question catalog issue: {error}"), EXIT_CONFIG))
}

pub fn summarize(session: &EstimationSession) -> Result<EstimateSummary, Failure> {
    let missing = unanswered_questions(session);
    let incomplete = || {
        ("input", format!("questionnaire incomplete: missing {}", missing.join(", ")), EXIT_INPUT)
    };

    let recommendation = session.recommendation().ok_or_else(incomplete)?;
    let average_days = session.average_days().ok_or_else(incomplete)?;
    let quick = session.quick_estimate().ok_or_else(incomplete)?;
    let detailed = session.detailed_budget().ok_or_else(incomplete)?;
    let discount = session.discount().ok_or_else(incomplete)?;

    info!(
        event_name = "estimate.computed",
        stack = recommendation.stack.as_str(),
        days_min = recommendation.days.min,
        days_max = recommendation.days.max,
        total_budget = %detailed.total,
        final_budget = %discount.final_budget,
        "estimate computed"
    );

    let display = DisplayAmounts {
        quick_range: format!(
            "{} - {}",
            format_currency(quick.budget_min),
            format_currency(quick.budget_max)
        ),
        total_budget: format_currency(detailed.total),
        final_budget: format_currency(discount.final_budget),
        final_budget_short: format_currency_k(discount.final_budget.max(Decimal::ZERO)),
    };

    Ok(EstimateSummary {
        project_name: session.project_name().to_string(),
        estimation_type: session.estimation_type(),
        recommendation,
        average_days,
        quick,
        detailed,
        discount,
        display,
    })
}
