// src/services/extraction_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    models::catalog::CandidateItem,
    services::analyzer::DocumentAnalyzer,
};

/// Instrução enviada junto com o tarifário. A política de extração mora
/// aqui (juntar tabelas de várias páginas, ignorar texto de marketing,
/// um único preço base quando houver escalonado) e o modelo é instruído
/// a responder só com o array JSON.
const EXTRACTION_INSTRUCTION: &str = r#"Eres un asistente de extracción de listas de precios de construcción.
El documento adjunto es la lista de precios (tarifa) de un proveedor.

Extrae TODOS los artículos con precio y responde SOLO con un array JSON, sin
markdown y sin comentarios. Cada elemento debe tener exactamente esta forma:

[
  {"nombre": "string", "precio": number, "unidad": "string", "referencia": "string o null"}
]

Reglas:
- Une las tablas que continúan en páginas siguientes; son la misma lista.
- Ignora portadas, texto legal, marketing y condiciones comerciales.
- Si un artículo tiene precios escalonados por volumen, usa solo el precio
  base por unidad.
- "unidad" es la unidad de venta tal como aparece (m2, ml, kg, saco, pieza).
- No inventes artículos que no estén en el documento."#;

#[derive(Clone)]
pub struct ExtractionService {
    analyzer: Arc<dyn DocumentAnalyzer>,
}

impl ExtractionService {
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Envia o documento ao serviço generativo e faz o parse da resposta.
    /// Uma falha sobe imediatamente para o operador; não há retry.
    pub async fn extract_candidates(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<Vec<CandidateItem>, AppError> {
        let reply = self
            .analyzer
            .analyze_document(document, mime_type, EXTRACTION_INSTRUCTION)
            .await
            .map_err(|e| AppError::ExtractionError(e.to_string()))?;

        let candidates = parse_candidates(&reply)?;
        tracing::info!(total = candidates.len(), "Itens candidatos extraídos do tarifário");
        Ok(candidates)
    }
}

/// Faz o parse da resposta do modelo. A resposta deveria ser só o array
/// JSON, mas modelos embrulham em cercas de código ou prosa; tiramos o
/// embrulho e exigimos um array válido.
pub fn parse_candidates(reply: &str) -> Result<Vec<CandidateItem>, AppError> {
    let unfenced = strip_code_fences(reply);
    let window = extract_json_array(unfenced)?;

    serde_json::from_str::<Vec<CandidateItem>>(window)
        .map_err(|e| AppError::ExtractionError(format!("JSON da resposta não é um array de itens: {e}")))
}

fn strip_code_fences(s: &str) -> &str {
    s.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Recorta o array mais externo da resposta (o modelo às vezes antepõe
/// raciocínio ou texto solto).
fn extract_json_array(s: &str) -> Result<&str, AppError> {
    let start = s
        .find('[')
        .ok_or_else(|| AppError::ExtractionError("resposta sem array JSON".to_string()))?;
    let end = s
        .rfind(']')
        .ok_or_else(|| AppError::ExtractionError("resposta sem array JSON".to_string()))?;
    if end <= start {
        return Err(AppError::ExtractionError(
            "array JSON malformado na resposta".to_string(),
        ));
    }
    Ok(&s[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parses_fenced_reply_with_spanish_keys() {
        let reply = "```json\n[{\"nombre\":\"Panel\",\"precio\":12.5,\"unidad\":\"m2\"}]\n```";
        let items = parse_candidates(reply).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Panel");
        assert_eq!(items[0].price, Some(Decimal::new(125, 1)));
        assert_eq!(items[0].unit.as_deref(), Some("m2"));
    }

    #[test]
    fn parses_reply_wrapped_in_prose() {
        let reply = "Claro, aquí está la lista extraída:\n\n[{\"nombre\":\"Saco cemento\",\"precio\":8.9,\"unidad\":\"saco\",\"referencia\":\"C-42\"}]\n\nEspero que ayude.";
        let items = parse_candidates(reply).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].reference.as_deref(), Some("C-42"));
    }

    #[test]
    fn reply_without_json_fails_with_extraction_error() {
        let err = parse_candidates("No encontré ninguna tabla de precios.").unwrap_err();
        assert!(matches!(err, AppError::ExtractionError(_)));
    }

    #[test]
    fn reply_with_object_instead_of_array_fails() {
        let err = parse_candidates("{\"items\": 3}").unwrap_err();
        assert!(matches!(err, AppError::ExtractionError(_)));
    }

    #[test]
    fn array_of_non_items_fails() {
        let err = parse_candidates("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AppError::ExtractionError(_)));
    }

    #[test]
    fn empty_array_is_a_valid_reply() {
        let items = parse_candidates("```json\n[]\n```").unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn extract_candidates_goes_through_the_analyzer() {
        use crate::services::analyzer::mock::MockAnalyzer;
        use std::sync::Arc;

        let service = ExtractionService::new(Arc::new(MockAnalyzer::replying(
            "[{\"nombre\":\"Perfil U\",\"precio\":4.2,\"unidad\":\"ml\"}]",
        )));
        let items = service
            .extract_candidates(b"%PDF-fake", "application/pdf")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Perfil U");
    }
}
