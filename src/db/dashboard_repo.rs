// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, StatusCount},
        projects::{ProjectStatus, TimelineEntry},
    },
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação para um snapshot consistente dos cards.
        let mut tx = executor.begin().await?;

        let counts: Vec<StatusCount> = sqlx::query_as(
            "SELECT status, COUNT(*) as total FROM projects GROUP BY status",
        )
        .fetch_all(&mut *tx)
        .await?;

        let count_for = |status: ProjectStatus| {
            counts
                .iter()
                .find(|c| c.status == status)
                .map(|c| c.total)
                .unwrap_or(0)
        };

        let open_quote_total: (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quote_total), 0) FROM projects WHERE status = 'QUOTE'",
        )
        .fetch_one(&mut *tx)
        .await?;

        let materials_in_catalog: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM materials")
            .fetch_one(&mut *tx)
            .await?;

        let recent_activity: Vec<TimelineEntry> = sqlx::query_as(
            "SELECT id, project_id, kind, body, is_public, created_at
             FROM timeline_entries
             WHERE is_public
             ORDER BY created_at DESC
             LIMIT 10",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            leads: count_for(ProjectStatus::Lead),
            open_quotes: count_for(ProjectStatus::Quote),
            in_progress: count_for(ProjectStatus::InProgress),
            completed: count_for(ProjectStatus::Completed),
            open_quote_total: open_quote_total.0,
            materials_in_catalog: materials_in_catalog.0,
            recent_activity,
        })
    }
}
