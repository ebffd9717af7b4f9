// src/db/crm_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Client, IngestionMethod, Supplier},
};

const CLIENT_COLUMNS: &str =
    "id, full_name, email, phone, portal_token, created_at, updated_at";

const SUPPLIER_COLUMNS: &str =
    "id, name, contact_email, phone, ingestion_method, created_at, updated_at";

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        portal_token: &str,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO clients (full_name, email, phone, portal_token)
             VALUES ($1, $2, $3, $4)
             RETURNING {CLIENT_COLUMNS}"
        );
        let client = sqlx::query_as::<_, Client>(&query)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .bind(portal_token)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    pub async fn get_all_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY full_name ASC");
        let clients = sqlx::query_as::<_, Client>(&query)
            .fetch_all(executor)
            .await?;
        Ok(clients)
    }

    pub async fn get_client<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ClientNotFound)
    }

    /// Resolve o token de portal para o cliente dono dele.
    pub async fn get_client_by_token<'e, E>(
        &self,
        executor: E,
        portal_token: &str,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE portal_token = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(portal_token)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::InvalidPortalToken)
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE clients SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ClientNotFound)
    }

    /// Troca o token de portal. O valor antigo deixa de funcionar na hora
    /// e nunca volta a ser emitido (índice único em portal_token).
    pub async fn rotate_portal_token<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_token: &str,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE clients SET portal_token = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(new_token)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ClientNotFound)
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        name: &str,
        contact_email: Option<&str>,
        phone: Option<&str>,
        ingestion_method: IngestionMethod,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO suppliers (name, contact_email, phone, ingestion_method)
             VALUES ($1, $2, $3, $4)
             RETURNING {SUPPLIER_COLUMNS}"
        );
        let supplier = sqlx::query_as::<_, Supplier>(&query)
            .bind(name)
            .bind(contact_email)
            .bind(phone)
            .bind(ingestion_method)
            .fetch_one(executor)
            .await?;

        Ok(supplier)
    }

    pub async fn get_all_suppliers<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name ASC");
        let suppliers = sqlx::query_as::<_, Supplier>(&query)
            .fetch_all(executor)
            .await?;
        Ok(suppliers)
    }

    pub async fn get_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        contact_email: Option<&str>,
        phone: Option<&str>,
        ingestion_method: Option<IngestionMethod>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE suppliers SET
                name = COALESCE($2, name),
                contact_email = COALESCE($3, contact_email),
                phone = COALESCE($4, phone),
                ingestion_method = COALESCE($5, ingestion_method),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SUPPLIER_COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(name)
            .bind(contact_email)
            .bind(phone)
            .bind(ingestion_method)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }
}
