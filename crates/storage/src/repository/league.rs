use sqlx::PgPool;

use crate::error::{Result, StorageError};
use crate::models::League;

pub struct LeagueRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeagueRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all leagues, lowest tier first
    pub async fn list(&self) -> Result<Vec<League>> {
        let leagues = sqlx::query_as::<_, League>(
            r#"
            SELECT league_id, slug, name, order_index, icon_url
            FROM leagues
            ORDER BY order_index ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(leagues)
    }

    pub async fn find_by_id(&self, league_id: i32) -> Result<League> {
        let league = sqlx::query_as::<_, League>(
            r#"
            SELECT league_id, slug, name, order_index, icon_url
            FROM leagues
            WHERE league_id = $1
            "#,
        )
        .bind(league_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(league)
    }
}
