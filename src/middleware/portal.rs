// src/middleware/portal.rs

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::crm::Client};

// O guard do portal: resolve o token do caminho para o cliente dono dele
// e injeta o cliente nos extensions. Token desconhecido corta a
// requisição aqui, antes de qualquer handler.
pub async fn portal_guard(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = params.get("token").ok_or(AppError::InvalidPortalToken)?;

    let client = app_state
        .crm_repo
        .get_client_by_token(&app_state.db_pool, token)
        .await?;

    request.extensions_mut().insert(client);
    Ok(next.run(request).await)
}

// Extrator para obter o cliente do portal diretamente nos handlers.
pub struct PortalClient(pub Client);

impl<S> FromRequestParts<S> for PortalClient
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Client>()
            .cloned()
            .map(PortalClient)
            .ok_or(AppError::InvalidPortalToken)
    }
}
