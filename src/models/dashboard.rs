// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::projects::TimelineEntry;

// Cards do topo do painel.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub leads: i64,
    pub open_quotes: i64,
    pub in_progress: i64,
    pub completed: i64,
    // Soma dos orçamentos ainda não aprovados.
    pub open_quote_total: Decimal,
    pub materials_in_catalog: i64,
    pub recent_activity: Vec<TimelineEntry>,
}

// Contagem por estado vinda do GROUP BY.
#[derive(Debug, FromRow)]
pub struct StatusCount {
    pub status: crate::models::projects::ProjectStatus,
    pub total: i64,
}
