//! Plain-text estimate report rendered with tera.
//!
//! Amounts reach the template as decimal strings and go through the `money` and
//! `money_k` filters, which share the currency formatter used everywhere else.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context as _, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use stackwise_core::{calculate_discount, format_currency, format_currency_k, Project};
use tera::{Context, Tera};

const REPORT_TEMPLATE: &str = "estimate_report.txt";

pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
    tera.register_filter("money_k", tera_money_k_filter);
}

fn filter_amount(value: &tera::Value, filter: &str) -> tera::Result<Decimal> {
    match value {
        tera::Value::String(raw) => Decimal::from_str(raw)
            .map_err(|error| tera::Error::msg(format!("{filter}: `{raw}` is not an amount: {error}"))),
        tera::Value::Number(number) => Decimal::from_str(&number.to_string())
            .map_err(|error| tera::Error::msg(format!("{filter}: {error}"))),
        tera::Value::Null => Ok(Decimal::ZERO),
        other => Err(tera::Error::msg(format!("{filter} filter expects a number, got {other}"))),
    }
}

/// `amount | money` → `42 000 €`
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    filter_amount(value, "money").map(|amount| tera::Value::String(format_currency(amount)))
}

/// `amount | money_k` → `42k €`
fn tera_money_k_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    filter_amount(value, "money_k").map(|amount| tera::Value::String(format_currency_k(amount)))
}

#[derive(Debug, Serialize)]
struct ReportLine {
    profile: String,
    days: Decimal,
    tjm_standard: Decimal,
    tjm_applied: Decimal,
    custom_rate: bool,
    cost: Decimal,
}

#[derive(Debug, Serialize)]
struct ReportView {
    id: String,
    name: String,
    status: &'static str,
    stack: &'static str,
    infra_min: Decimal,
    infra_max: Decimal,
    total_days: i64,
    lines: Vec<ReportLine>,
    total_budget: Decimal,
    discount_type: &'static str,
    has_discount: bool,
    discount_amount: Decimal,
    final_budget: Decimal,
    created_on: String,
    updated_on: String,
}

impl From<&Project> for ReportView {
    fn from(project: &Project) -> Self {
        let record = &project.record;
        let infra = record.stack.definition().infra_cost;
        let discount =
            calculate_discount(record.total_budget, record.discount_type, record.discount_value);

        Self {
            id: project.id.0.clone(),
            name: record.name.clone(),
            status: record.status.as_str(),
            stack: record.stack.as_str(),
            infra_min: infra.min,
            infra_max: infra.max,
            total_days: record.total_days,
            lines: record
                .budget_breakdown
                .iter()
                .map(|item| ReportLine {
                    profile: item.profile.clone(),
                    days: item.days,
                    tjm_standard: item.tjm_standard,
                    tjm_applied: item.tjm_applied,
                    custom_rate: item.tjm_applied != item.tjm_standard,
                    cost: item.cost,
                })
                .collect(),
            total_budget: record.total_budget,
            discount_type: record.discount_type.as_str(),
            has_discount: !discount.discount_amount.is_zero(),
            discount_amount: discount.discount_amount,
            final_budget: record.final_budget,
            created_on: project.date_created.format("%d/%m/%Y").to_string(),
            updated_on: project.date_updated.format("%d/%m/%Y").to_string(),
        }
    }
}

pub fn render(project: &Project) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(
        REPORT_TEMPLATE,
        include_str!("../../../../templates/estimate_report.txt"),
    )
    .context("failed to compile the estimate report template")?;
    register_template_filters(&mut tera);

    let context = Context::from_serialize(ReportView::from(project))
        .context("failed to build the report context")?;
    tera.render(REPORT_TEMPLATE, &context)
        .with_context(|| format!("failed to render the report for project {}", project.id))
}
