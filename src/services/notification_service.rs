// src/services/notification_service.rs

use serde::Serialize;

use crate::common::error::AppError;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

/// Cliente do serviço de e-mail transacional. O timeout do reqwest::Client
/// limita quanto tempo a requisição do usuário fica presa no envio.
#[derive(Clone)]
pub struct NotificationService {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    // Remetente configurado e caixa interna da empresa.
    from_address: String,
    company_inbox: String,
}

impl NotificationService {
    pub fn new(
        http: reqwest::Client,
        api_url: String,
        api_key: String,
        from_address: String,
        company_inbox: String,
    ) -> Self {
        Self {
            http,
            api_url,
            api_key,
            from_address,
            company_inbox,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError> {
        let request = SendEmailRequest {
            from: &self.from_address,
            to: vec![to],
            subject,
            html,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::EmailError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::EmailError(format!(
                "provedor de e-mail respondeu {status}: {body}"
            )));
        }

        tracing::info!(to = to, subject = subject, "E-mail enviado");
        Ok(())
    }

    /// Envia ao cliente o link do portal dele.
    pub async fn send_portal_link(
        &self,
        to: &str,
        client_name: &str,
        portal_url: &str,
    ) -> Result<(), AppError> {
        let subject = "Acesso ao portal das suas obras";
        let html = format!(
            "<p>Olá, {client_name}.</p>\
             <p>Acompanhe o andamento das suas obras e aprove orçamentos pelo seu portal:</p>\
             <p><a href=\"{portal_url}\">{portal_url}</a></p>\
             <p>Este link é pessoal; não o compartilhe.</p>"
        );
        self.send(to, subject, &html).await
    }

    /// Avisa a equipe que um orçamento foi aprovado pelo portal.
    /// Best-effort: quem chama decide se a falha derruba a operação.
    pub async fn notify_quote_approved(
        &self,
        project_title: &str,
        client_name: &str,
    ) -> Result<(), AppError> {
        let subject = format!("Orçamento aprovado: {project_title}");
        let html = format!(
            "<p>O cliente <strong>{client_name}</strong> aprovou o orçamento da obra \
             <strong>{project_title}</strong> pelo portal.</p>\
             <p>A obra passou para execução.</p>"
        );
        self.send(&self.company_inbox, &subject, &html).await
    }
}
