// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    db::{
        CatalogRepository, CrmRepository, DashboardRepository, InvoiceRepository,
        ProjectsRepository, SettingsRepository,
    },
    services::{
        AssistantService, CatalogService, CrmService, DocumentService, ExtractionService,
        InvoiceService, NotificationService, ProjectService, StorageService,
        analyzer::GenerativeClient,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    // Repositórios que os guards e handlers usam direto
    pub crm_repo: CrmRepository,
    pub settings_repo: SettingsRepository,
    pub dashboard_repo: DashboardRepository,

    // Serviços
    pub crm_service: CrmService,
    pub catalog_service: CatalogService,
    pub extraction_service: ExtractionService,
    pub assistant_service: AssistantService,
    pub project_service: ProjectService,
    pub invoice_service: InvoiceService,
    pub document_service: DocumentService,
    pub storage_service: StorageService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Serviço generativo
        let ai_base_url = env::var("AI_API_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string());
        let ai_model = env::var("AI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let ai_api_key = env::var("AI_API_KEY").expect("AI_API_KEY deve ser definida");

        // E-mail transacional
        let email_api_url = env::var("EMAIL_API_URL")
            .unwrap_or_else(|_| "https://api.resend.com/emails".to_string());
        let email_api_key = env::var("EMAIL_API_KEY").expect("EMAIL_API_KEY deve ser definida");
        let email_from = env::var("EMAIL_FROM").expect("EMAIL_FROM deve ser definido");
        let company_inbox = env::var("COMPANY_INBOX").expect("COMPANY_INBOX deve ser definida");

        // Portal do cliente e armazém de documentos
        let portal_base_url =
            env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/portal".to_string());
        let storage_dir = env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string());

        // Identidade de serviço: dona das linhas que o pipeline grava.
        let service_identity: Uuid = env::var("SERVICE_ACCOUNT_ID")
            .expect("SERVICE_ACCOUNT_ID deve ser definido")
            .parse()
            .expect("SERVICE_ACCOUNT_ID deve ser um UUID válido");

        // Teto explícito para as chamadas remotas (IA e e-mail): a
        // requisição do usuário fica bloqueada no máximo esse tempo.
        let remote_timeout: u64 = env::var("REMOTE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(remote_timeout))
            .build()?;

        // --- Monta o gráfico de dependências ---
        let crm_repo = CrmRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let projects_repo = ProjectsRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let analyzer = Arc::new(GenerativeClient::new(
            http_client.clone(),
            ai_base_url,
            ai_model,
            ai_api_key,
        ));

        let notifier = NotificationService::new(
            http_client,
            email_api_url,
            email_api_key,
            email_from,
            company_inbox,
        );

        let crm_service = CrmService::new(crm_repo.clone(), notifier.clone(), portal_base_url);
        let catalog_service = CatalogService::new(catalog_repo.clone(), service_identity);
        let extraction_service = ExtractionService::new(analyzer.clone());
        let assistant_service = AssistantService::new(analyzer, catalog_repo.clone());
        let project_service = ProjectService::new(
            projects_repo.clone(),
            crm_repo.clone(),
            catalog_repo.clone(),
            notifier,
        );
        let invoice_service = InvoiceService::new(invoice_repo.clone(), projects_repo.clone());
        let document_service = DocumentService::new(
            invoice_repo,
            projects_repo,
            crm_repo.clone(),
            catalog_repo,
            settings_repo.clone(),
        );
        let storage_service = StorageService::new(storage_dir);

        Ok(Self {
            db_pool,
            crm_repo,
            settings_repo,
            dashboard_repo,
            crm_service,
            catalog_service,
            extraction_service,
            assistant_service,
            project_service,
            invoice_service,
            document_service,
            storage_service,
        })
    }
}
