// src/services/analyzer.rs

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct AnalyzerError(pub String);

/// Seam com o serviço generativo de análise de documentos. A resposta é
/// texto livre; quem chama faz o parse defensivo.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Envia um documento binário + instrução e devolve o texto da resposta.
    async fn analyze_document(
        &self,
        document: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, AnalyzerError>;

    /// Chamada só de texto (chat, memórias técnicas, rascunhos).
    async fn analyze_text(&self, instruction: &str) -> Result<String, AnalyzerError>;
}

// --- Wire types da API generativa ---

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Cliente de produção. O timeout vem do reqwest::Client configurado no
/// AppState: a requisição do usuário fica bloqueada no máximo esse tempo.
#[derive(Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GenerativeClient {
    pub fn new(http: reqwest::Client, base_url: String, model: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            model,
            api_key,
        }
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, AnalyzerError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError(format!("chamada ao serviço generativo falhou: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError(format!(
                "serviço generativo respondeu {status}: {body}"
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError(format!("resposta do serviço generativo ilegível: {e}")))?;

        let text = reply
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AnalyzerError("resposta vazia do serviço generativo".to_string()));
        }

        tracing::debug!(chars = text.len(), "Resposta do serviço generativo recebida");
        Ok(text)
    }
}

#[async_trait]
impl DocumentAnalyzer for GenerativeClient {
    async fn analyze_document(
        &self,
        document: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, AnalyzerError> {
        let parts = vec![
            Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: mime_type.to_string(),
                    data: STANDARD.encode(document),
                }),
            },
            Part {
                text: Some(instruction.to_string()),
                inline_data: None,
            },
        ];
        self.generate(parts).await
    }

    async fn analyze_text(&self, instruction: &str) -> Result<String, AnalyzerError> {
        let parts = vec![Part {
            text: Some(instruction.to_string()),
            inline_data: None,
        }];
        self.generate(parts).await
    }
}

// Analisador de mentira para os testes: devolve respostas enlatadas.
#[cfg(test)]
pub mod mock {
    use super::*;

    pub struct MockAnalyzer {
        pub reply: String,
    }

    impl MockAnalyzer {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self {
                reply: reply.into(),
            }
        }
    }

    #[async_trait]
    impl DocumentAnalyzer for MockAnalyzer {
        async fn analyze_document(
            &self,
            _document: &[u8],
            _mime_type: &str,
            _instruction: &str,
        ) -> Result<String, AnalyzerError> {
            Ok(self.reply.clone())
        }

        async fn analyze_text(&self, _instruction: &str) -> Result<String, AnalyzerError> {
            Ok(self.reply.clone())
        }
    }
}
