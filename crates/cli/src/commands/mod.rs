pub mod budget;
pub mod config;
pub mod doctor;
pub mod estimate;
pub mod input;
pub mod migrate;
pub mod project;
pub mod report;
pub mod seed;

use std::future::Future;

use serde::Serialize;
use stackwise_core::config::{AppConfig, LoadOptions};
use stackwise_core::ApplicationError;
use stackwise_db::{connect_with_settings, migrations, DbPool, RepositoryError};
use tracing::warn;
use uuid::Uuid;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_DATABASE: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_INPUT: u8 = 6;
pub const EXIT_NOT_FOUND: u8 = 7;

/// `(error_class, message, exit_code)` carried out of a failed command.
pub type Failure = (&'static str, String, u8);

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::ok(command, message.into(), None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self::ok(command, message.into(), Some(data)),
            Err(error) => Self::failure(
                command,
                "serialization",
                format!("failed to serialize command output: {error}"),
                EXIT_RUNTIME,
            ),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_failure(command: &str, (error_class, message, exit_code): Failure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }

    fn ok(command: &str, message: String, data: Option<serde_json::Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, Failure> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        application_failure(ApplicationError::Configuration(format!("configuration issue: {error}")))
    })
}

/// Runs `work` on a fresh current-thread runtime against a migrated pool. The pool is
/// closed whatever the outcome.
pub(crate) fn with_pool<T, F, Fut>(config: &AppConfig, work: F) -> Result<T, Failure>
where
    F: FnOnce(DbPool) -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| ("runtime_init", format!("failed to initialize async runtime: {error}"), EXIT_RUNTIME),
    )?;

    runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DATABASE))?;

        if let Err(error) = migrations::run_pending(&pool).await {
            pool.close().await;
            return Err(("migration", error.to_string(), EXIT_MIGRATION));
        }

        let result = work(pool.clone()).await;
        pool.close().await;
        result
    })
}

pub(crate) fn repository_failure(error: RepositoryError) -> Failure {
    application_failure(match error {
        RepositoryError::Domain(error) => ApplicationError::Domain(error),
        other => ApplicationError::Persistence(other.to_string()),
    })
}

/// Maps a layered application error onto the command payload. The interface error
/// supplies the operator-facing sentence; a fresh correlation id ties the payload to
/// the `command.failed` log event.
pub(crate) fn application_failure(error: impl Into<ApplicationError>) -> Failure {
    let error = error.into();
    let (error_class, exit_code) = match &error {
        ApplicationError::Domain(_) => ("domain", EXIT_INPUT),
        ApplicationError::Persistence(_) => ("persistence", EXIT_DATABASE),
        ApplicationError::Configuration(_) => ("config_validation", EXIT_CONFIG),
    };

    let interface = error.into_interface(Uuid::new_v4().to_string());
    warn!(
        event_name = "command.failed",
        correlation_id = interface.correlation_id(),
        error_class,
        error = %interface,
        "command failed"
    );

    let message = format!(
        "{} {interface} (correlation id {})",
        interface.user_message(),
        interface.correlation_id()
    );
    (error_class, message, exit_code)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use stackwise_core::{ApplicationError, DomainError};
    use stackwise_db::RepositoryError;

    use super::{
        application_failure, repository_failure, CommandResult, EXIT_CONFIG, EXIT_DATABASE,
        EXIT_INPUT,
    };

    #[test]
    fn success_payload_omits_absent_data() {
        let result = CommandResult::success("migrate", "applied pending migrations");
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn data_payload_is_embedded_as_json() {
        let result = CommandResult::success_with_data("estimate", "done", json!({"stack": "B"}));
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(payload["data"]["stack"], "B");
    }

    #[test]
    fn failure_keeps_exit_code_and_class() {
        let result = CommandResult::failure("project", "input", "bad \"quote\"", EXIT_INPUT);
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, EXIT_INPUT);
        assert_eq!(payload["error_class"], "input");
        assert_eq!(payload["message"], "bad \"quote\"");
    }

    #[test]
    fn domain_errors_carry_user_message_and_correlation_id() {
        let (class, message, exit_code) = application_failure(DomainError::MissingProjectName);

        assert_eq!(class, "domain");
        assert_eq!(exit_code, EXIT_INPUT);
        assert!(message.starts_with("The estimate could not be processed."), "{message}");
        assert!(message.contains("bad request: project name is required"), "{message}");
        assert!(message.contains("(correlation id "), "{message}");
    }

    #[test]
    fn each_failure_gets_its_own_correlation_id() {
        let (_, first, _) = application_failure(DomainError::IncompleteQuestionnaire);
        let (_, second, _) = application_failure(DomainError::IncompleteQuestionnaire);

        assert_ne!(first, second);
    }

    #[test]
    fn repository_and_config_errors_keep_their_exit_codes() {
        let (class, message, exit_code) =
            repository_failure(RepositoryError::Decode("bad stack `Z`".to_string()));
        assert_eq!((class, exit_code), ("persistence", EXIT_DATABASE));
        assert!(message.starts_with("Project storage is temporarily unavailable."), "{message}");

        let (class, message, exit_code) =
            repository_failure(RepositoryError::Domain(DomainError::EmptyProfileSource));
        assert_eq!((class, exit_code), ("domain", EXIT_INPUT));
        assert!(message.contains("profile source returned no profiles"), "{message}");

        let (class, message, exit_code) =
            application_failure(ApplicationError::Configuration("catalog missing".to_string()));
        assert_eq!((class, exit_code), ("config_validation", EXIT_CONFIG));
        assert!(message.contains("internal error: catalog missing"), "{message}");
    }
}
