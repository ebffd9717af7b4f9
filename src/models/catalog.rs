// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Unidades de medida ---
// Conjunto fixo e pequeno; o banco usa o enum material_unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "material_unit", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialUnit {
    Piece,
    SquareMeter,
    LinearMeter,
    Kilogram,
    Sack,
}

impl MaterialUnit {
    /// Converte a unidade livre que o modelo extraiu ("m2", "kg", "pza"...)
    /// para o nosso conjunto fechado. Qualquer coisa desconhecida vira peça.
    pub fn from_extracted(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "m2" | "m²" | "metro cuadrado" | "metro quadrado" => MaterialUnit::SquareMeter,
            "ml" | "m" | "metro lineal" | "metro linear" => MaterialUnit::LinearMeter,
            "kg" | "kilo" | "kilogramo" | "quilo" => MaterialUnit::Kilogram,
            "saco" | "bulto" | "sack" => MaterialUnit::Sack,
            _ => MaterialUnit::Piece,
        }
    }
}

// --- Materiais (catálogo) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    #[schema(example = "Panel de yeso 12.7mm")]
    pub name: String,
    pub unit: MaterialUnit,
    #[schema(example = "125.50")]
    pub cost_price: Decimal,
    #[schema(example = "Tabiquería")]
    pub category: Option<String>,
    pub supplier_id: Option<Uuid>,
    // Margem aplicada na importação, guardada como metadado.
    pub markup_pct: Option<Decimal>,
    pub reference: Option<String>,
    #[schema(ignore)]
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Tarifários (listas de preço enviadas) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TariffDocument {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub category: String,
    #[schema(ignore)]
    pub storage_path: String,
    #[schema(example = "tarifa_2026.pdf")]
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

// --- Itens candidatos extraídos de um tarifário ---
// O serviço generativo responde com as chaves em espanhol (os tarifários
// são em espanhol); os aliases aceitam os dois vocabulários.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateItem {
    #[serde(alias = "nombre")]
    #[schema(example = "Panel")]
    pub name: String,

    // O modelo às vezes devolve o preço como string ("12,50") ou omite.
    // Aceitamos o que vier; o preview trata ausência como custo zero.
    #[serde(alias = "precio", default, deserialize_with = "flexible_price")]
    pub price: Option<Decimal>,

    #[serde(alias = "unidad")]
    #[schema(example = "m2")]
    pub unit: Option<String>,

    #[serde(alias = "referencia", default)]
    pub reference: Option<String>,
}

fn flexible_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().and_then(Decimal::from_f64_retain),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse::<Decimal>().ok(),
        _ => None,
    })
}

// --- Preview custo vs. preço sugerido ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub name: String,
    pub unit: MaterialUnit,
    pub cost: Decimal,
    pub suggested_price: Decimal,
    // Preço que já está no catálogo para (nome, fornecedor), se houver.
    pub current_price: Option<Decimal>,
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_accepts_spanish_keys() {
        let item: CandidateItem =
            serde_json::from_str(r#"{"nombre":"Panel","precio":12.5,"unidad":"m2"}"#).unwrap();
        assert_eq!(item.name, "Panel");
        assert_eq!(item.price, Some(Decimal::new(125, 1)));
        assert_eq!(item.unit.as_deref(), Some("m2"));
    }

    #[test]
    fn candidate_price_tolerates_strings_and_absence() {
        let with_comma: CandidateItem =
            serde_json::from_str(r#"{"name":"Saco cemento","price":"89,90"}"#).unwrap();
        assert_eq!(with_comma.price, Some("89.90".parse().unwrap()));

        let missing: CandidateItem = serde_json::from_str(r#"{"name":"Perfil"}"#).unwrap();
        assert_eq!(missing.price, None);

        let garbage: CandidateItem =
            serde_json::from_str(r#"{"name":"Perfil","price":"consultar"}"#).unwrap();
        assert_eq!(garbage.price, None);
    }

    #[test]
    fn unit_normalization_covers_the_catalog_set() {
        assert_eq!(MaterialUnit::from_extracted("m2"), MaterialUnit::SquareMeter);
        assert_eq!(MaterialUnit::from_extracted("ML"), MaterialUnit::LinearMeter);
        assert_eq!(MaterialUnit::from_extracted("kg"), MaterialUnit::Kilogram);
        assert_eq!(MaterialUnit::from_extracted("saco"), MaterialUnit::Sack);
        assert_eq!(MaterialUnit::from_extracted("caja"), MaterialUnit::Piece);
    }
}
