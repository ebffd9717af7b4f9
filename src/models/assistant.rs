// src/models/assistant.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
}

// --- Rascunho de orçamento gerado pelo assistente ---
// O modelo é obrigado a responder exatamente neste formato; o parse é
// estrito via serde. Nada de raspar tabelas markdown da resposta.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteDraft {
    #[schema(example = "Tabiquería interior — planta 2")]
    pub title: String,
    pub items: Vec<QuoteDraftItem>,
    #[schema(example = "4890.00")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteDraftItem {
    #[schema(example = "Panel de yeso 12.7mm")]
    pub name: String,
    #[schema(example = "120.0")]
    pub quantity: Decimal,
    #[schema(example = "163.15")]
    pub unit_price: Decimal,
}
