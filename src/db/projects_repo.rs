// src/db/projects_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::projects::{BudgetItem, Project, ProjectStatus, TimelineEntry, TimelineKind},
};

const PROJECT_COLUMNS: &str = "id, client_id, title, status, completion_pct, quote_total, \
     technical_memo, approved_at, approved_ip, approved_user_agent, approval_method, \
     created_at, updated_at";

const BUDGET_COLUMNS: &str =
    "id, project_id, material_id, quantity, applied_price, margin_pct, created_at";

const TIMELINE_COLUMNS: &str = "id, project_id, kind, body, is_public, created_at";

#[derive(Clone)]
pub struct ProjectsRepository {
    pool: PgPool,
}

impl ProjectsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  OBRAS
    // =========================================================================

    pub async fn create_project<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        title: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO projects (client_id, title)
             VALUES ($1, $2)
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .bind(title)
            .fetch_one(executor)
            .await?;

        Ok(project)
    }

    pub async fn get_all_projects<'e, E>(&self, executor: E) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC");
        let projects = sqlx::query_as::<_, Project>(&query)
            .fetch_all(executor)
            .await?;
        Ok(projects)
    }

    pub async fn get_projects_by_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE client_id = $1 ORDER BY created_at DESC"
        );
        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .fetch_all(executor)
            .await?;
        Ok(projects)
    }

    pub async fn get_project<'e, E>(&self, executor: E, id: Uuid) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ProjectStatus,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE projects SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn update_progress<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        completion_pct: i16,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE projects SET completion_pct = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(completion_pct)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    pub async fn set_quote_total<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        quote_total: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE projects SET quote_total = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(quote_total)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_technical_memo<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        memo: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE projects SET technical_memo = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(memo)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProjectNotFound)
    }

    /// Registra a aprovação do orçamento e avança a obra num único UPDATE.
    pub async fn record_approval<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approved_at: DateTime<Utc>,
        ip: &str,
        user_agent: &str,
        method: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE projects SET
                status = 'IN_PROGRESS',
                approved_at = $2,
                approved_ip = $3,
                approved_user_agent = $4,
                approval_method = $5,
                updated_at = NOW()
             WHERE id = $1 AND status = 'QUOTE'
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(approved_at)
            .bind(ip)
            .bind(user_agent)
            .bind(method)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("aprovação exige obra em orçamento".to_string())
            })
    }

    // =========================================================================
    //  LINHAS DE ORÇAMENTO
    // =========================================================================

    pub async fn add_budget_item<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        material_id: Uuid,
        quantity: Decimal,
        applied_price: Decimal,
        margin_pct: Decimal,
    ) -> Result<BudgetItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO budget_items (project_id, material_id, quantity, applied_price, margin_pct)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {BUDGET_COLUMNS}"
        );
        let item = sqlx::query_as::<_, BudgetItem>(&query)
            .bind(project_id)
            .bind(material_id)
            .bind(quantity)
            .bind(applied_price)
            .bind(margin_pct)
            .fetch_one(executor)
            .await?;

        Ok(item)
    }

    pub async fn list_budget_items<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Vec<BudgetItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {BUDGET_COLUMNS} FROM budget_items
             WHERE project_id = $1 ORDER BY created_at ASC"
        );
        let items = sqlx::query_as::<_, BudgetItem>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn count_budget_items<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM budget_items WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    // =========================================================================
    //  LINHA DO TEMPO (append-only)
    // =========================================================================

    pub async fn append_timeline_entry<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        kind: TimelineKind,
        body: &str,
        is_public: bool,
    ) -> Result<TimelineEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO timeline_entries (project_id, kind, body, is_public)
             VALUES ($1, $2, $3, $4)
             RETURNING {TIMELINE_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimelineEntry>(&query)
            .bind(project_id)
            .bind(kind)
            .bind(body)
            .bind(is_public)
            .fetch_one(executor)
            .await?;

        Ok(entry)
    }

    /// `public_only` filtra o que o portal do cliente pode ver.
    pub async fn list_timeline<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        public_only: bool,
    ) -> Result<Vec<TimelineEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {TIMELINE_COLUMNS} FROM timeline_entries
             WHERE project_id = $1 AND ($2 = FALSE OR is_public)
             ORDER BY created_at DESC"
        );
        let entries = sqlx::query_as::<_, TimelineEntry>(&query)
            .bind(project_id)
            .bind(public_only)
            .fetch_all(executor)
            .await?;
        Ok(entries)
    }
}
