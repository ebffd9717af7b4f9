// src/services/assistant_service.rs

use std::sync::Arc;

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{assistant::QuoteDraft, catalog::Material, projects::ProjectDetail},
    services::analyzer::DocumentAnalyzer,
};

const QUOTE_DRAFT_INSTRUCTION: &str = r#"Eres el asistente técnico de una empresa constructora.
Con el catálogo de materiales y el pedido del operador, prepara un borrador
de presupuesto.

Responde SOLO con un objeto JSON, sin markdown y sin comentarios, exactamente
con esta forma:

{"title": "string", "items": [{"name": "string", "quantity": number, "unitPrice": number}], "total": number}

Reglas:
- Usa únicamente materiales del catálogo entregado y sus precios.
- "total" debe ser la suma de quantity * unitPrice de todos los items.
- No añadas campos extra."#;

const MEMO_INSTRUCTION: &str = r#"Eres el asistente técnico de una empresa constructora.
Redacta una memoria técnica breve y profesional (texto plano, sin markdown)
para la obra descrita a continuación: alcance, materiales previstos y
observaciones de ejecución. Máximo cuatro párrafos."#;

#[derive(Clone)]
pub struct AssistantService {
    analyzer: Arc<dyn DocumentAnalyzer>,
    catalog_repo: CatalogRepository,
}

impl AssistantService {
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>, catalog_repo: CatalogRepository) -> Self {
        Self {
            analyzer,
            catalog_repo,
        }
    }

    /// Catálogo resumido que vai no contexto do modelo. Linhas recém
    /// importadas aparecem aqui imediatamente.
    fn render_catalog_context(materials: &[Material]) -> String {
        let mut out = String::from("Catálogo de materiales (nombre | unidad | costo):\n");
        for m in materials {
            out.push_str(&format!(
                "- {} | {:?} | {}\n",
                m.name, m.unit, m.cost_price
            ));
        }
        out
    }

    /// Chat livre do operador, ancorado no catálogo atual.
    pub async fn chat<'e, E>(&self, executor: E, message: &str) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materials = self.catalog_repo.get_all_materials(executor, None).await?;
        let prompt = format!(
            "Eres el asistente de una empresa constructora. Responde en el idioma \
             del operador, con precisión y sin inventar precios.\n\n{}\nPregunta del operador: {}",
            Self::render_catalog_context(&materials),
            message
        );

        self.analyzer
            .analyze_text(&prompt)
            .await
            .map_err(|e| AppError::AssistantError(e.to_string()))
    }

    /// Rascunho de orçamento estruturado. O modelo devolve JSON estrito;
    /// o parse é via serde com campos fechados.
    pub async fn draft_quote<'e, E>(
        &self,
        executor: E,
        request: &str,
    ) -> Result<QuoteDraft, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materials = self.catalog_repo.get_all_materials(executor, None).await?;
        let prompt = format!(
            "{QUOTE_DRAFT_INSTRUCTION}\n\n{}\nPedido del operador: {}",
            Self::render_catalog_context(&materials),
            request
        );

        let reply = self
            .analyzer
            .analyze_text(&prompt)
            .await
            .map_err(|e| AppError::AssistantError(e.to_string()))?;

        parse_quote_draft(&reply)
    }

    /// Redige a memória técnica da obra a partir do detalhe dela.
    pub async fn draft_technical_memo(&self, detail: &ProjectDetail) -> Result<String, AppError> {
        let mut context = format!(
            "Obra: {}\nCliente: {}\nEstado: {:?}\nPresupuesto total: {}\n",
            detail.header.title,
            detail.client_name,
            detail.header.status,
            detail.header.quote_total
        );
        if !detail.items.is_empty() {
            context.push_str("Partidas del presupuesto (cantidad x precio aplicado):\n");
            for item in &detail.items {
                context.push_str(&format!(
                    "- {} x {}\n",
                    item.quantity, item.applied_price
                ));
            }
        }

        self.analyzer
            .analyze_text(&format!("{MEMO_INSTRUCTION}\n\n{context}"))
            .await
            .map_err(|e| AppError::AssistantError(e.to_string()))
    }
}

/// Parse estrito do rascunho de orçamento. Nada de raspar tabelas
/// markdown: ou a resposta contém o objeto JSON esperado, ou falha.
pub fn parse_quote_draft(reply: &str) -> Result<QuoteDraft, AppError> {
    let trimmed = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = trimmed
        .find('{')
        .ok_or_else(|| AppError::AssistantError("resposta sem objeto JSON".to_string()))?;
    let end = trimmed
        .rfind('}')
        .ok_or_else(|| AppError::AssistantError("resposta sem objeto JSON".to_string()))?;
    if end <= start {
        return Err(AppError::AssistantError("JSON malformado na resposta".to_string()));
    }

    serde_json::from_str::<QuoteDraft>(&trimmed[start..=end])
        .map_err(|e| AppError::AssistantError(format!("rascunho fora do esquema: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn quote_draft_parses_strict_schema() {
        let reply = r#"```json
{"title":"Tabiquería planta 2","items":[{"name":"Panel","quantity":120,"unitPrice":16.5}],"total":1980}
```"#;
        let draft = parse_quote_draft(reply).unwrap();

        assert_eq!(draft.title, "Tabiquería planta 2");
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].quantity, Decimal::new(120, 0));
        assert_eq!(draft.total, Decimal::new(1980, 0));
    }

    #[test]
    fn quote_draft_rejects_extra_fields() {
        // deny_unknown_fields: o modelo não pode inventar campos.
        let reply = r#"{"title":"X","items":[],"total":0,"descuento":10}"#;
        let err = parse_quote_draft(reply).unwrap_err();
        assert!(matches!(err, AppError::AssistantError(_)));
    }

    #[test]
    fn quote_draft_rejects_markdown_tables() {
        let reply = "| Material | Qtd | Precio |\n|---|---|---|\n| Panel | 10 | 16.5 |";
        let err = parse_quote_draft(reply).unwrap_err();
        assert!(matches!(err, AppError::AssistantError(_)));
    }
}
