use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Material não encontrado")]
    MaterialNotFound,

    #[error("Obra não encontrada")]
    ProjectNotFound,

    #[error("Tarifário não encontrado")]
    TariffNotFound,

    #[error("Fatura não encontrada")]
    InvoiceNotFound,

    #[error("Token de portal inválido")]
    InvalidPortalToken,

    #[error("Transição de estado inválida: {0}")]
    InvalidTransition(String),

    #[error("A obra já tem orçamento montado")]
    QuoteAlreadyAssembled,

    #[error("A obra ainda não está concluída")]
    ProjectNotCompleted,

    #[error("A obra já tem fatura emitida")]
    InvoiceAlreadyExists,

    // Chamada ao serviço generativo falhou ou a resposta não era utilizável.
    #[error("Falha na extração: {0}")]
    ExtractionError(String),

    #[error("Falha na importação do catálogo: {0}")]
    ImportError(String),

    #[error("Falha no assistente: {0}")]
    AssistantError(String),

    #[error("Falha no envio de e-mail: {0}")]
    EmailError(String),

    #[error("Arquivo enviado inválido: {0}")]
    InvalidUpload(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados. O detalhe vai para o log,
    // nunca para a resposta: mensagem crua do backend não é contrato.
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::ClientNotFound => (StatusCode::NOT_FOUND, "Cliente não encontrado."),
            AppError::SupplierNotFound => (StatusCode::NOT_FOUND, "Fornecedor não encontrado."),
            AppError::MaterialNotFound => (StatusCode::NOT_FOUND, "Material não encontrado."),
            AppError::ProjectNotFound => (StatusCode::NOT_FOUND, "Obra não encontrada."),
            AppError::TariffNotFound => (StatusCode::NOT_FOUND, "Tarifário não encontrado."),
            AppError::InvoiceNotFound => (StatusCode::NOT_FOUND, "Fatura não encontrada."),

            AppError::InvalidPortalToken => {
                (StatusCode::UNAUTHORIZED, "Link de portal inválido ou revogado.")
            }

            AppError::InvalidTransition(ref detail) => {
                tracing::warn!("Transição rejeitada: {}", detail);
                (StatusCode::CONFLICT, "Transição de estado inválida para esta obra.")
            }
            AppError::QuoteAlreadyAssembled => {
                (StatusCode::CONFLICT, "Esta obra já tem um orçamento montado.")
            }
            AppError::ProjectNotCompleted => (
                StatusCode::CONFLICT,
                "A fatura só pode ser emitida com a obra concluída.",
            ),
            AppError::InvoiceAlreadyExists => {
                (StatusCode::CONFLICT, "Esta obra já tem uma fatura emitida.")
            }

            AppError::ExtractionError(ref detail) => {
                tracing::error!("Extração falhou: {}", detail);
                (StatusCode::BAD_GATEWAY, "Não foi possível extrair itens do documento.")
            }
            AppError::AssistantError(ref detail) => {
                tracing::error!("Assistente falhou: {}", detail);
                (StatusCode::BAD_GATEWAY, "O assistente está indisponível no momento.")
            }
            AppError::EmailError(ref detail) => {
                tracing::error!("Envio de e-mail falhou: {}", detail);
                (StatusCode::BAD_GATEWAY, "Não foi possível enviar o e-mail.")
            }
            AppError::ImportError(ref detail) => {
                tracing::error!("Importação falhou: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Falha ao gravar os itens no catálogo.")
            }

            AppError::InvalidUpload(ref detail) => {
                tracing::warn!("Upload rejeitado: {}", detail);
                (StatusCode::BAD_REQUEST, "Arquivo enviado inválido.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError, fontes)
            // viram 500 com mensagem genérica. O log fica com o detalhe.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
