// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- CRM ---
        handlers::crm::create_client,
        handlers::crm::list_clients,
        handlers::crm::get_client,
        handlers::crm::update_client,
        handlers::crm::rotate_portal_token,
        handlers::crm::send_portal_link,
        handlers::crm::create_supplier,
        handlers::crm::list_suppliers,
        handlers::crm::get_supplier,
        handlers::crm::update_supplier,

        // --- CATALOG ---
        handlers::catalog::create_material,
        handlers::catalog::list_materials,
        handlers::catalog::update_material,
        handlers::catalog::upload_tariff,
        handlers::catalog::list_tariffs,
        handlers::catalog::extract_tariff,
        handlers::catalog::import_tariff,
        handlers::catalog::delete_tariff,

        // --- PROJECTS ---
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::assemble_quote,
        handlers::projects::transition_project,
        handlers::projects::update_progress,
        handlers::projects::append_timeline,
        handlers::projects::draft_memo,
        handlers::projects::submit_invoice,
        handlers::projects::get_project_invoice,

        // --- INVOICES ---
        handlers::invoices::get_invoice,
        handlers::invoices::download_invoice_pdf,

        // --- PORTAL ---
        handlers::portal::portal_home,
        handlers::portal::portal_project_detail,
        handlers::portal::approve_quote,

        // --- ASSISTANT ---
        handlers::assistant::chat,
        handlers::assistant::quote_draft,

        // --- DASHBOARD ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- CRM ---
            models::crm::Client,
            models::crm::Supplier,
            models::crm::IngestionMethod,
            handlers::crm::CreateClientPayload,
            handlers::crm::UpdateClientPayload,
            handlers::crm::CreateSupplierPayload,
            handlers::crm::UpdateSupplierPayload,

            // --- CATALOG ---
            models::catalog::MaterialUnit,
            models::catalog::Material,
            models::catalog::TariffDocument,
            models::catalog::CandidateItem,
            models::catalog::PriceComparison,
            handlers::catalog::CreateMaterialPayload,
            handlers::catalog::UpdateMaterialPayload,
            handlers::catalog::ExtractTariffPayload,
            handlers::catalog::ExtractTariffResponse,
            handlers::catalog::ImportTariffPayload,

            // --- PROJECTS ---
            models::projects::ProjectStatus,
            models::projects::Project,
            models::projects::BudgetItem,
            models::projects::TimelineKind,
            models::projects::TimelineEntry,
            models::projects::ProjectDetail,
            handlers::projects::CreateProjectPayload,
            handlers::projects::QuoteLinePayload,
            handlers::projects::AssembleQuotePayload,
            handlers::projects::TransitionPayload,
            handlers::projects::ProgressPayload,
            handlers::projects::TimelinePayload,

            // --- INVOICES ---
            models::invoice::Invoice,

            // --- PORTAL ---
            handlers::portal::PortalHome,

            // --- ASSISTANT ---
            models::assistant::ChatReply,
            models::assistant::QuoteDraft,
            models::assistant::QuoteDraftItem,
            handlers::assistant::ChatPayload,
            handlers::assistant::QuoteDraftPayload,

            // --- SETTINGS / DASHBOARD ---
            models::settings::CompanySettings,
            models::settings::UpdateSettingsRequest,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Settings", description = "Perfil da empresa"),
        (name = "CRM", description = "Clientes, fornecedores e portal"),
        (name = "Catalog", description = "Materiais e ingestão de tarifários"),
        (name = "Projects", description = "Obras: funil, orçamento e linha do tempo"),
        (name = "Invoices", description = "Faturas encadeadas por hash"),
        (name = "Portal", description = "Portal do cliente (token capability)"),
        (name = "Assistant", description = "Assistente técnico (IA)"),
        (name = "Dashboard", description = "Indicadores do painel")
    )
)]
pub struct ApiDoc;
