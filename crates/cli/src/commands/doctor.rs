use serde::Serialize;
use stackwise_core::config::{AppConfig, LoadOptions};
use stackwise_db::{ProfileRepository, SqlProfileRepository};

use crate::commands::{repository_failure, with_pool};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_question_catalog(&config));
            checks.push(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["question_catalog", "database_profiles"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_question_catalog(config: &AppConfig) -> DoctorCheck {
    match config.question_catalog() {
        Ok(catalog) => DoctorCheck {
            name: "question_catalog",
            status: CheckStatus::Pass,
            details: format!("catalog `{}` with {} questions", catalog.version, catalog.len()),
        },
        Err(error) => {
            DoctorCheck { name: "question_catalog", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

/// Connects, migrates and counts profiles. An empty grid fails because budgets
/// cannot be detailed without profiles.
fn check_database(config: &AppConfig) -> DoctorCheck {
    let result = with_pool(config, |pool| async move {
        SqlProfileRepository::new(pool)
            .list()
            .await
            .map_err(repository_failure)
    });

    match result {
        Ok(profiles) if profiles.is_empty() => DoctorCheck {
            name: "database_profiles",
            status: CheckStatus::Fail,
            details: format!(
                "connected using `{}` but no profiles are stored; run `stackwise seed`",
                config.database.url
            ),
        },
        Ok(profiles) => DoctorCheck {
            name: "database_profiles",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`, {} profiles", config.database.url, profiles.len()),
        },
        Err((_, message, _)) => {
            DoctorCheck { name: "database_profiles", status: CheckStatus::Fail, details: message }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
