// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

// Id fixo da linha única de configuração (semeada pela migração).
pub const SETTINGS_ROW_ID: Uuid = Uuid::from_u128(1);

const SETTINGS_COLUMNS: &str =
    "id, company_name, document_number, address, default_markup, updated_at";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings<'e, E>(&self, executor: E) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {SETTINGS_COLUMNS} FROM company_settings WHERE id = $1");
        let settings = sqlx::query_as::<_, CompanySettings>(&query)
            .bind(SETTINGS_ROW_ID)
            .fetch_one(executor)
            .await?;
        Ok(settings)
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: UpdateSettingsRequest,
    ) -> Result<CompanySettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // COALESCE mantém o valor atual para campos não enviados.
        let query = format!(
            "UPDATE company_settings SET
                company_name = COALESCE($2, company_name),
                document_number = COALESCE($3, document_number),
                address = COALESCE($4, address),
                default_markup = COALESCE($5, default_markup),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SETTINGS_COLUMNS}"
        );
        let settings = sqlx::query_as::<_, CompanySettings>(&query)
            .bind(SETTINGS_ROW_ID)
            .bind(input.company_name)
            .bind(input.document_number)
            .bind(input.address)
            .bind(input.default_markup)
            .fetch_one(executor)
            .await?;
        Ok(settings)
    }
}
