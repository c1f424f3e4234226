use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use thiserror::Error;

use stackwise_core::domain::profile::{ProfileId, TjmProfile};
use stackwise_core::domain::project::{Project, ProjectDraft, ProjectId, ProjectStatus};
use stackwise_core::errors::DomainError;

pub mod memory;
pub mod profile;
pub mod project;

pub use memory::{InMemoryProfileRepository, InMemoryProjectRepository};
pub use profile::SqlProfileRepository;
pub use project::SqlProjectRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Persistence collaborator for saved estimates.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<Project>, RepositoryError>;
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    async fn create(&self, draft: ProjectDraft) -> Result<Project, RepositoryError>;
    async fn update(
        &self,
        id: &ProjectId,
        draft: ProjectDraft,
    ) -> Result<Option<Project>, RepositoryError>;
    /// Fails with [`DomainError::InvalidProjectTransition`] when the move is not allowed.
    async fn update_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError>;
    async fn delete(&self, id: &ProjectId) -> Result<bool, RepositoryError>;
}

/// Source of staffing profiles, ordered by `sort` then id.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<TjmProfile>, RepositoryError>;
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<TjmProfile>, RepositoryError>;
    async fn save(&self, profile: TjmProfile) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &ProfileId) -> Result<bool, RepositoryError>;
}

pub(crate) fn new_project_id() -> ProjectId {
    ProjectId(uuid::Uuid::new_v4().to_string())
}

/// Current time at the precision stored in the database.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn decode_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn decode_enum<T: FromStr<Err = String>>(
    column: &str,
    raw: &str,
) -> Result<T, RepositoryError> {
    raw.parse::<T>().map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn encode_json<T: serde::Serialize>(
    column: &str,
    value: &T,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn decode_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}
