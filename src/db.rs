pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod projects_repo;
pub use projects_repo::ProjectsRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
