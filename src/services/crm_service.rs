// src/services/crm_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{Client, IngestionMethod, Supplier},
    services::notification_service::NotificationService,
};

#[derive(Clone)]
pub struct CrmService {
    crm_repo: CrmRepository,
    notifier: NotificationService,
    // Base pública do portal; o link enviado é <base>/<token>.
    portal_base_url: String,
}

impl CrmService {
    pub fn new(
        crm_repo: CrmRepository,
        notifier: NotificationService,
        portal_base_url: String,
    ) -> Self {
        Self {
            crm_repo,
            notifier,
            portal_base_url,
        }
    }

    /// Token opaco de portal. Gerado sempre do zero; nunca derivado de
    /// dados do cliente e nunca reaproveitado.
    fn new_portal_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn portal_url(&self, token: &str) -> String {
        format!("{}/{}", self.portal_base_url.trim_end_matches('/'), token)
    }

    // --- Clientes ---

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo
            .create_client(executor, full_name, email, phone, &Self::new_portal_token())
            .await
    }

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo.get_all_clients(executor).await
    }

    pub async fn get_client<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo.get_client(executor, id).await
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
        self.crm_repo
            .update_client(executor, id, full_name, email, phone)
            .await
    }

    /// Gira o token do portal. O link antigo morre na hora.
    pub async fn rotate_portal_token<'e, E>(&self, executor: E, id: Uuid) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo
            .rotate_portal_token(executor, id, &Self::new_portal_token())
            .await
    }

    /// Envia o link do portal por e-mail. Aqui o envio É a operação:
    /// falha do provedor sobe como EmailError.
    pub async fn send_portal_link<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = self.crm_repo.get_client(executor, id).await?;
        let email = client.email.as_deref().ok_or_else(|| {
            AppError::EmailError("cliente sem endereço de e-mail cadastrado".to_string())
        })?;

        self.notifier
            .send_portal_link(email, &client.full_name, &self.portal_url(&client.portal_token))
            .await
    }

    // --- Fornecedores ---

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
        self.crm_repo
            .create_supplier(executor, name, contact_email, phone, ingestion_method)
            .await
    }

    pub async fn list_suppliers<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo.get_all_suppliers(executor).await
    }

    pub async fn get_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.crm_repo.get_supplier(executor, id).await
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
        self.crm_repo
            .update_supplier(executor, id, name, contact_email, phone, ingestion_method)
            .await
    }
}
