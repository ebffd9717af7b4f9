pub mod analyzer;
pub mod assistant_service;
pub mod catalog_service;
pub mod crm_service;
pub mod document_service;
pub mod extraction_service;
pub mod invoice_service;
pub mod notification_service;
pub mod project_service;
pub mod storage_service;

pub use assistant_service::AssistantService;
pub use catalog_service::CatalogService;
pub use crm_service::CrmService;
pub use document_service::DocumentService;
pub use extraction_service::ExtractionService;
pub use invoice_service::InvoiceService;
pub use notification_service::NotificationService;
pub use project_service::ProjectService;
pub use storage_service::StorageService;
