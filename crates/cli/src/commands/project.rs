use std::path::Path;

use serde::Serialize;
use stackwise_core::{
    format_currency, EstimationSession, Project, ProjectId, ProjectStatus, StackTier,
};
use stackwise_db::{
    ProfileRepository, ProjectRepository, SqlProfileRepository, SqlProjectRepository,
};
use tracing::info;

use crate::commands::estimate::question_catalog;
use crate::commands::input::EstimateInput;
use crate::commands::{
    application_failure, load_config, repository_failure, report, with_pool, CommandResult,
    Failure, EXIT_INPUT, EXIT_NOT_FOUND,
};

#[derive(Debug, Serialize)]
struct ProjectListing {
    id: String,
    name: String,
    stack: StackTier,
    status: ProjectStatus,
    total_days: i64,
    final_budget: String,
    date_created: String,
}

impl From<&Project> for ProjectListing {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.0.clone(),
            name: project.record.name.clone(),
            stack: project.record.stack,
            status: project.record.status,
            total_days: project.record.total_days,
            final_budget: format_currency(project.record.final_budget),
            date_created: project.date_created.to_rfc3339(),
        }
    }
}

pub fn list() -> CommandResult {
    let result = load_config().and_then(|config| {
        with_pool(&config, |pool| async move {
            SqlProjectRepository::new(pool).list().await.map_err(repository_failure)
        })
    });

    match result {
        Ok(projects) => {
            let listing: Vec<ProjectListing> = projects.iter().map(ProjectListing::from).collect();
            CommandResult::success_with_data(
                "project.list",
                format!("{} stored projects", listing.len()),
                listing,
            )
        }
        Err(failure) => CommandResult::from_failure("project.list", failure),
    }
}

pub fn show(id: &str) -> CommandResult {
    match find(id) {
        Ok(project) => {
            let message = format!("project `{}`", project.record.name);
            CommandResult::success_with_data("project.show", message, project)
        }
        Err(failure) => CommandResult::from_failure("project.show", failure),
    }
}

/// Saves the estimate described by the input document. Without `id` it becomes a new
/// draft project. With `id` the stored project is restored, the document is applied
/// over it and the project is updated in place, keeping its status.
pub fn save(input_path: &Path, id: Option<&str>) -> CommandResult {
    let result = load_config().and_then(|config| {
        let input = EstimateInput::read(input_path)?;
        let catalog = question_catalog(&config)?;
        let project_id = id.map(|id| ProjectId(id.to_string()));

        with_pool(&config, |pool| async move {
            let profiles =
                SqlProfileRepository::new(pool.clone()).list().await.map_err(repository_failure)?;
            let projects = SqlProjectRepository::new(pool);

            let stored = match &project_id {
                Some(project_id) => Some(
                    projects
                        .find_by_id(project_id)
                        .await
                        .map_err(repository_failure)?
                        .ok_or_else(|| not_found(project_id))?,
                ),
                None => None,
            };

            let mut session = input.into_session_over(catalog, profiles, stored.as_ref())?;
            persist(&projects, &mut session).await
        })
    });

    match result {
        Ok(project) => {
            let message = format!("saved project `{}` as {}", project.record.name, project.id);
            CommandResult::success_with_data("project.save", message, ProjectListing::from(&project))
        }
        Err(failure) => CommandResult::from_failure("project.save", failure),
    }
}

/// Creates the project on first save and updates it once the session is bound to one.
async fn persist(
    projects: &impl ProjectRepository,
    session: &mut EstimationSession,
) -> Result<Project, Failure> {
    let draft = session.to_project_draft().map_err(application_failure)?;
    let existing = session.saved_project_id().cloned();

    let project = match &existing {
        Some(id) => projects
            .update(id, draft)
            .await
            .map_err(repository_failure)?
            .ok_or_else(|| not_found(id))?,
        None => projects.create(draft).await.map_err(repository_failure)?,
    };
    session.mark_saved(project.id.clone());

    info!(
        event_name = "project.saved",
        project_id = %project.id,
        stack = project.record.stack.as_str(),
        updated = existing.is_some(),
        "estimate saved as project"
    );
    Ok(project)
}

pub fn set_status(id: &str, status: &str) -> CommandResult {
    let result = status
        .parse::<ProjectStatus>()
        .map_err(|error| ("input", error, EXIT_INPUT))
        .and_then(|status| {
            let config = load_config()?;
            let project_id = ProjectId(id.to_string());
            with_pool(&config, |pool| async move {
                SqlProjectRepository::new(pool)
                    .update_status(&project_id, status)
                    .await
                    .map_err(repository_failure)?
                    .ok_or_else(|| not_found(&project_id))
            })
        });

    match result {
        Ok(project) => CommandResult::success_with_data(
            "project.status",
            format!("project {} is now {}", project.id, project.record.status.as_str()),
            ProjectListing::from(&project),
        ),
        Err(failure) => CommandResult::from_failure("project.status", failure),
    }
}

pub fn delete(id: &str) -> CommandResult {
    let result = load_config().and_then(|config| {
        let project_id = ProjectId(id.to_string());
        with_pool(&config, |pool| async move {
            let deleted = SqlProjectRepository::new(pool)
                .delete(&project_id)
                .await
                .map_err(repository_failure)?;
            if deleted {
                Ok(project_id)
            } else {
                Err(not_found(&project_id))
            }
        })
    });

    match result {
        Ok(project_id) => {
            CommandResult::success("project.delete", format!("deleted project {project_id}"))
        }
        Err(failure) => CommandResult::from_failure("project.delete", failure),
    }
}

/// Plain-text estimate report. Printed as-is rather than wrapped in JSON.
pub fn report(id: &str) -> CommandResult {
    let result = find(id).and_then(|project| {
        report::render(&project)
            .map_err(|error| ("report", format!("{error:#}"), crate::commands::EXIT_RUNTIME))
    });

    match result {
        Ok(text) => CommandResult { exit_code: 0, output: text },
        Err(failure) => CommandResult::from_failure("project.report", failure),
    }
}

fn find(id: &str) -> Result<Project, Failure> {
    let config = load_config()?;
    let project_id = ProjectId(id.to_string());
    with_pool(&config, |pool| async move {
        SqlProjectRepository::new(pool)
            .find_by_id(&project_id)
            .await
            .map_err(repository_failure)?
            .ok_or_else(|| not_found(&project_id))
    })
}

fn not_found(id: &ProjectId) -> Failure {
    ("not_found", format!("no project with id `{id}`"), EXIT_NOT_FOUND)
}
