// src/db/invoice_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::invoice::Invoice};

const INVOICE_COLUMNS: &str =
    "id, project_id, number, content_hash, previous_hash, qr_payload, payload, created_at";

// Chave fixa do advisory lock que serializa a escrita da cadeia.
const INVOICE_CHAIN_LOCK_KEY: i64 = 7_420_130_001;

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serializa a montagem da cadeia: segura um advisory lock transacional
    /// até o COMMIT. Duas submissões concorrentes nunca leem o mesmo
    /// "último hash".
    pub async fn lock_chain<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(INVOICE_CHAIN_LOCK_KEY)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Hash da fatura mais recente de todo o sistema (cadeia global,
    /// não por obra). `None` quando a cadeia ainda está vazia.
    pub async fn last_chain_hash<'e, E>(&self, executor: E) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT content_hash FROM invoices ORDER BY created_at DESC, number DESC LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|(hash,)| hash))
    }

    /// Próximo número da sequência dedicada (sem sufixo aleatório).
    pub async fn next_invoice_number<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as("SELECT nextval('invoice_number_seq')")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    pub async fn insert_invoice<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        number: &str,
        content_hash: &str,
        previous_hash: &str,
        qr_payload: &str,
        payload: &Value,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO invoices
                (project_id, number, content_hash, previous_hash, qr_payload, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {INVOICE_COLUMNS}"
        );
        sqlx::query_as::<_, Invoice>(&query)
            .bind(project_id)
            .bind(number)
            .bind(content_hash)
            .bind(previous_hash)
            .bind(qr_payload)
            .bind(payload)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // Índice único em project_id: no máximo uma fatura por obra.
                    if db_err.is_unique_violation() {
                        return AppError::InvoiceAlreadyExists;
                    }
                }
                e.into()
            })
    }

    pub async fn get_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::InvoiceNotFound)
    }

    pub async fn find_by_project<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE project_id = $1");
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(project_id)
            .fetch_optional(executor)
            .await?;
        Ok(invoice)
    }
}
