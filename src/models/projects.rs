// src/models/projects.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Ciclo de vida da obra ---
// lead -> quote -> in_progress -> completed, sempre um passo por vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Lead,
    Quote,
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Próximo estado válido do funil, se houver.
    pub fn next(self) -> Option<ProjectStatus> {
        match self {
            ProjectStatus::Lead => Some(ProjectStatus::Quote),
            ProjectStatus::Quote => Some(ProjectStatus::InProgress),
            ProjectStatus::InProgress => Some(ProjectStatus::Completed),
            ProjectStatus::Completed => None,
        }
    }

    /// O funil só anda para frente e nunca pula etapas.
    pub fn can_transition_to(self, target: ProjectStatus) -> bool {
        self.next() == Some(target)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub client_id: Uuid,
    #[schema(example = "Reforma nave industrial — Polígono Sur")]
    pub title: String,
    pub status: ProjectStatus,
    #[schema(example = 45)]
    pub completion_pct: i16,
    #[schema(example = "18500.00")]
    pub quote_total: Decimal,
    pub technical_memo: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_ip: Option<String>,
    pub approved_user_agent: Option<String>,
    pub approval_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha de orçamento: preço aplicado pode divergir do preço de catálogo.
// Criada na montagem do orçamento e somente leitura depois disso.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub material_id: Uuid,
    #[schema(example = "12.5")]
    pub quantity: Decimal,
    #[schema(example = "163.15")]
    pub applied_price: Decimal,
    #[schema(example = "30.00")]
    pub margin_pct: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "timeline_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineKind {
    Comment,
    Logistics,
    Delay,
    Milestone,
}

// Apêndice puro: nenhum fluxo edita ou apaga entradas da linha do tempo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub kind: TimelineKind,
    pub body: String,
    // Entradas privadas nunca aparecem no portal do cliente.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

// Detalhe completo para a tela da obra.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub header: Project,
    pub client_name: String,
    pub items: Vec<BudgetItem>,
    pub timeline: Vec<TimelineEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funnel_only_moves_one_step_forward() {
        assert!(ProjectStatus::Lead.can_transition_to(ProjectStatus::Quote));
        assert!(ProjectStatus::Quote.can_transition_to(ProjectStatus::InProgress));
        assert!(ProjectStatus::InProgress.can_transition_to(ProjectStatus::Completed));
    }

    #[test]
    fn funnel_rejects_jumps_and_regressions() {
        assert!(!ProjectStatus::Lead.can_transition_to(ProjectStatus::InProgress));
        assert!(!ProjectStatus::Lead.can_transition_to(ProjectStatus::Completed));
        assert!(!ProjectStatus::Quote.can_transition_to(ProjectStatus::Lead));
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Lead));
        assert_eq!(ProjectStatus::Completed.next(), None);
    }
}
