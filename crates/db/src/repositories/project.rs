use sqlx::Row;
use tracing::info;

use stackwise_core::domain::project::{Project, ProjectDraft, ProjectId, ProjectStatus};

use super::{
    decode_decimal, decode_enum, decode_json, decode_timestamp, encode_json, encode_timestamp,
    new_project_id, now, ProjectRepository, RepositoryError,
};
use crate::DbPool;

const PROJECT_COLUMNS: &str = "id, name, stack, total_days, total_budget, discount_type,
    discount_value, final_budget, status, answers_json, budget_breakdown_json, documents_json,
    ai_analysis_json, conversation_history_json, date_created, date_updated";

pub struct SqlProjectRepository {
    pool: DbPool,
}

impl SqlProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn get<'r, T>(row: &'r sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn optional_json<T: serde::de::DeserializeOwned>(
    column: &str,
    raw: Option<String>,
) -> Result<Option<T>, RepositoryError> {
    match raw {
        Some(raw) if raw != "null" => decode_json(column, &raw).map(Some),
        _ => Ok(None),
    }
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project, RepositoryError> {
    let id: String = get(row, "id")?;
    let stack: String = get(row, "stack")?;
    let total_budget: String = get(row, "total_budget")?;
    let discount_type: String = get(row, "discount_type")?;
    let discount_value: String = get(row, "discount_value")?;
    let final_budget: String = get(row, "final_budget")?;
    let status: String = get(row, "status")?;
    let answers_json: String = get(row, "answers_json")?;
    let breakdown_json: String = get(row, "budget_breakdown_json")?;
    let date_created: String = get(row, "date_created")?;
    let date_updated: String = get(row, "date_updated")?;

    Ok(Project {
        id: ProjectId(id),
        date_created: decode_timestamp("date_created", &date_created)?,
        date_updated: decode_timestamp("date_updated", &date_updated)?,
        record: ProjectDraft {
            name: get(row, "name")?,
            stack: decode_enum("stack", &stack)?,
            total_days: get(row, "total_days")?,
            total_budget: decode_decimal("total_budget", &total_budget)?,
            discount_type: decode_enum("discount_type", &discount_type)?,
            discount_value: decode_decimal("discount_value", &discount_value)?,
            final_budget: decode_decimal("final_budget", &final_budget)?,
            status: decode_enum("status", &status)?,
            answers: decode_json("answers_json", &answers_json)?,
            budget_breakdown: decode_json("budget_breakdown_json", &breakdown_json)?,
            documents: optional_json("documents_json", get(row, "documents_json")?)?,
            ai_analysis: optional_json("ai_analysis_json", get(row, "ai_analysis_json")?)?,
            conversation_history: optional_json(
                "conversation_history_json",
                get(row, "conversation_history_json")?,
            )?,
        },
    })
}

/// JSON columns of a draft, encoded once so insert and update bind the same values.
struct EncodedDraft {
    answers: String,
    breakdown: String,
    documents: Option<String>,
    ai_analysis: Option<String>,
    conversation: Option<String>,
}

impl EncodedDraft {
    fn new(draft: &ProjectDraft) -> Result<Self, RepositoryError> {
        Ok(Self {
            answers: encode_json("answers_json", &draft.answers)?,
            breakdown: encode_json("budget_breakdown_json", &draft.budget_breakdown)?,
            documents: draft
                .documents
                .as_ref()
                .map(|documents| encode_json("documents_json", documents))
                .transpose()?,
            ai_analysis: draft
                .ai_analysis
                .as_ref()
                .map(|analysis| encode_json("ai_analysis_json", analysis))
                .transpose()?,
            conversation: draft
                .conversation_history
                .as_ref()
                .map(|history| encode_json("conversation_history_json", history))
                .transpose()?,
        })
    }
}

#[async_trait::async_trait]
impl ProjectRepository for SqlProjectRepository {
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project ORDER BY date_created DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_project).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_project(r)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, draft: ProjectDraft) -> Result<Project, RepositoryError> {
        let project = Project::from_draft(new_project_id(), draft, now());
        let encoded = EncodedDraft::new(&project.record)?;
        let record = &project.record;

        sqlx::query(
            "INSERT INTO project (id, name, stack, total_days, total_budget, discount_type,
                                  discount_value, final_budget, status, answers_json,
                                  budget_breakdown_json, documents_json, ai_analysis_json,
                                  conversation_history_json, date_created, date_updated)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.id.0)
        .bind(&record.name)
        .bind(record.stack.as_str())
        .bind(record.total_days)
        .bind(record.total_budget.to_string())
        .bind(record.discount_type.as_str())
        .bind(record.discount_value.to_string())
        .bind(record.final_budget.to_string())
        .bind(record.status.as_str())
        .bind(&encoded.answers)
        .bind(&encoded.breakdown)
        .bind(&encoded.documents)
        .bind(&encoded.ai_analysis)
        .bind(&encoded.conversation)
        .bind(encode_timestamp(&project.date_created))
        .bind(encode_timestamp(&project.date_updated))
        .execute(&self.pool)
        .await?;

        info!(
            event_name = "project.created",
            project_id = %project.id,
            stack = record.stack.as_str(),
            "project saved"
        );
        Ok(project)
    }

    async fn update(
        &self,
        id: &ProjectId,
        draft: ProjectDraft,
    ) -> Result<Option<Project>, RepositoryError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let project = Project {
            id: existing.id,
            date_created: existing.date_created,
            date_updated: now(),
            record: draft,
        };
        let encoded = EncodedDraft::new(&project.record)?;
        let record = &project.record;

        sqlx::query(
            "UPDATE project SET
                 name = ?, stack = ?, total_days = ?, total_budget = ?, discount_type = ?,
                 discount_value = ?, final_budget = ?, status = ?, answers_json = ?,
                 budget_breakdown_json = ?, documents_json = ?, ai_analysis_json = ?,
                 conversation_history_json = ?, date_updated = ?
             WHERE id = ?",
        )
        .bind(&record.name)
        .bind(record.stack.as_str())
        .bind(record.total_days)
        .bind(record.total_budget.to_string())
        .bind(record.discount_type.as_str())
        .bind(record.discount_value.to_string())
        .bind(record.final_budget.to_string())
        .bind(record.status.as_str())
        .bind(&encoded.answers)
        .bind(&encoded.breakdown)
        .bind(&encoded.documents)
        .bind(&encoded.ai_analysis)
        .bind(&encoded.conversation)
        .bind(encode_timestamp(&project.date_updated))
        .bind(&project.id.0)
        .execute(&self.pool)
        .await?;

        info!(event_name = "project.updated", project_id = %project.id, "project updated");
        Ok(Some(project))
    }

    async fn update_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut project = row_to_project(&row)?;
        let previous = project.record.status;
        project.transition_to(status)?;
        project.date_updated = now();

        sqlx::query("UPDATE project SET status = ?, date_updated = ? WHERE id = ?")
            .bind(project.record.status.as_str())
            .bind(encode_timestamp(&project.date_updated))
            .bind(&project.id.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            event_name = "project.status_changed",
            project_id = %project.id,
            from = previous.as_str(),
            to = status.as_str(),
            "project status changed"
        );
        Ok(Some(project))
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM project WHERE id = ?").bind(&id.0).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
