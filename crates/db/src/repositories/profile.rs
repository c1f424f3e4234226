use sqlx::Row;

use stackwise_core::domain::profile::{ProfileId, TjmProfile};

use super::{decode_decimal, decode_enum, ProfileRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProfileRepository {
    pool: DbPool,
}

impl SqlProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<TjmProfile, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let level: String = row.try_get("level").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let tjm: String = row.try_get("tjm").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let default_percentage: String =
        row.try_get("default_percentage").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let sort: i64 = row.try_get("sort").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(TjmProfile {
        id: ProfileId(id),
        name,
        category: decode_enum("category", &category)?,
        level: decode_enum("level", &level)?,
        tjm: decode_decimal("tjm", &tjm)?,
        default_percentage: decode_decimal("default_percentage", &default_percentage)?,
        sort,
    })
}

#[async_trait::async_trait]
impl ProfileRepository for SqlProfileRepository {
    async fn list(&self) -> Result<Vec<TjmProfile>, RepositoryError> {
        let rows: Vec<sqlx::sqlite::SqliteRow> = sqlx::query(
            "SELECT id, name, category, level, tjm, default_percentage, sort
             FROM tjm_profile ORDER BY sort ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<TjmProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, category, level, tjm, default_percentage, sort
             FROM tjm_profile WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, profile: TjmProfile) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO tjm_profile (id, name, category, level, tjm, default_percentage, sort)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 category = excluded.category,
                 level = excluded.level,
                 tjm = excluded.tjm,
                 default_percentage = excluded.default_percentage,
                 sort = excluded.sort",
        )
        .bind(&profile.id.0)
        .bind(&profile.name)
        .bind(profile.category.as_str())
        .bind(profile.level.as_str())
        .bind(profile.tjm.to_string())
        .bind(profile.default_percentage.to_string())
        .bind(profile.sort)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ProfileId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tjm_profile WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
