// src/services/invoice_service.rs

use chrono::{Datelike, Utc};
use sha2::{Digest, Sha256};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InvoiceRepository, ProjectsRepository},
    models::{
        invoice::{Invoice, InvoiceLine, InvoicePayload},
        projects::{Project, ProjectStatus},
    },
};

// Valor de previous_hash da primeira fatura da cadeia.
const GENESIS_HASH: &str = "0";

#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    projects_repo: ProjectsRepository,
}

/// Digest SHA-256 do payload canônico, em hex minúsculo. Determinística e
/// total: a mesma string produz sempre o mesmo hash.
pub fn chain_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Guardas de emissão, na ordem: a obra precisa estar concluída e ainda
/// sem fatura. Rejeita antes de qualquer escrita.
pub fn ensure_invoiceable(project: &Project, existing_invoice: bool) -> Result<(), AppError> {
    if project.status != ProjectStatus::Completed {
        return Err(AppError::ProjectNotCompleted);
    }
    if existing_invoice {
        return Err(AppError::InvoiceAlreadyExists);
    }
    Ok(())
}

/// Número legível: FAC-<ano>-<sequência com seis dígitos>.
fn format_invoice_number(year: i32, seq: i64) -> String {
    format!("FAC-{year}-{seq:06}")
}

/// Payload do QR de verificação: número + prefixo do hash.
fn build_qr_payload(number: &str, content_hash: &str) -> String {
    let prefix: String = content_hash.chars().take(16).collect();
    format!("ODEPLAC|{number}|{prefix}")
}

impl InvoiceService {
    pub fn new(invoice_repo: InvoiceRepository, projects_repo: ProjectsRepository) -> Self {
        Self {
            invoice_repo,
            projects_repo,
        }
    }

    /// Emite a fatura de uma obra concluída, encadeada à fatura mais
    /// recente de todo o sistema.
    ///
    /// Ler o último hash e gravar a nova linha acontece numa transação
    /// única segurando um advisory lock: duas emissões concorrentes nunca
    /// referenciam o mesmo previous_hash.
    pub async fn submit_invoice<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Guardas (antes de qualquer escrita).
        let project = self.projects_repo.get_project(&mut *tx, project_id).await?;
        let existing = self
            .invoice_repo
            .find_by_project(&mut *tx, project_id)
            .await?;
        ensure_invoiceable(&project, existing.is_some())?;

        // 2. Serializa a cadeia e lê o último hash global.
        self.invoice_repo.lock_chain(&mut *tx).await?;
        let previous_hash = self
            .invoice_repo
            .last_chain_hash(&mut *tx)
            .await?
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        // 3. Payload canônico + hash.
        let items = self
            .projects_repo
            .list_budget_items(&mut *tx, project_id)
            .await?;
        let issued_at = Utc::now();
        let payload = InvoicePayload {
            project_id,
            client_id: project.client_id,
            items: items
                .iter()
                .map(|i| InvoiceLine {
                    item_id: i.id,
                    quantity: i.quantity,
                    applied_price: i.applied_price,
                })
                .collect(),
            total: project.quote_total,
            previous_hash: previous_hash.clone(),
            issued_at,
        };
        let canonical = serde_json::to_string(&payload)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;
        let content_hash = chain_hash(&canonical);

        // 4. Número sequencial + QR de verificação.
        let seq = self.invoice_repo.next_invoice_number(&mut *tx).await?;
        let number = format_invoice_number(issued_at.year(), seq);
        let qr_payload = build_qr_payload(&number, &content_hash);

        // 5. Grava com os dois hashes e o snapshot completo.
        let snapshot = serde_json::to_value(&payload)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e)))?;
        let invoice = self
            .invoice_repo
            .insert_invoice(
                &mut *tx,
                project_id,
                &number,
                &content_hash,
                &previous_hash,
                &qr_payload,
                &snapshot,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(number = %invoice.number, obra = %project_id, "Fatura emitida");
        Ok(invoice)
    }

    pub async fn get_invoice<'e, E>(&self, executor: E, id: Uuid) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.invoice_repo.get_invoice(executor, id).await
    }

    pub async fn get_invoice_for_project<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.invoice_repo
            .find_by_project(executor, project_id)
            .await?
            .ok_or(AppError::InvoiceNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn project_with_status(status: ProjectStatus) -> Project {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Project {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "Obra de teste".to_string(),
            status,
            completion_pct: 100,
            quote_total: Decimal::new(1000, 0),
            technical_memo: None,
            approved_at: None,
            approved_ip: None,
            approved_user_agent: None,
            approval_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn chain_hash_is_deterministic() {
        let a = chain_hash("payload canônico");
        let b = chain_hash("payload canônico");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn chain_hash_avalanches_on_single_char_change() {
        let a = chain_hash("fatura-0001");
        let b = chain_hash("fatura-0002");
        assert_ne!(a, b);
    }

    #[test]
    fn known_digest_spot_check() {
        // sha256("") é um valor público e conhecido.
        assert_eq!(
            chain_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn submission_requires_completed_project() {
        for status in [ProjectStatus::Lead, ProjectStatus::Quote, ProjectStatus::InProgress] {
            let err = ensure_invoiceable(&project_with_status(status), false).unwrap_err();
            assert!(matches!(err, AppError::ProjectNotCompleted));
        }
    }

    #[test]
    fn submission_rejects_duplicate_invoice() {
        let err =
            ensure_invoiceable(&project_with_status(ProjectStatus::Completed), true).unwrap_err();
        assert!(matches!(err, AppError::InvoiceAlreadyExists));
    }

    #[test]
    fn completed_project_without_invoice_passes_the_guards() {
        assert!(ensure_invoiceable(&project_with_status(ProjectStatus::Completed), false).is_ok());
    }

    #[test]
    fn invoice_number_is_year_prefixed_and_zero_padded() {
        assert_eq!(format_invoice_number(2026, 42), "FAC-2026-000042");
        assert_eq!(format_invoice_number(2026, 123_456), "FAC-2026-123456");
    }

    #[test]
    fn qr_payload_carries_number_and_hash_prefix() {
        let hash = chain_hash("x");
        let qr = build_qr_payload("FAC-2026-000001", &hash);

        let parts: Vec<_> = qr.split('|').collect();
        assert_eq!(parts[0], "ODEPLAC");
        assert_eq!(parts[1], "FAC-2026-000001");
        assert_eq!(parts[2].len(), 16);
        assert!(hash.starts_with(parts[2]));
    }

    #[test]
    fn canonical_payload_serializes_identically() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let payload = InvoicePayload {
            project_id: Uuid::from_u128(7),
            client_id: Uuid::from_u128(9),
            items: vec![InvoiceLine {
                item_id: Uuid::from_u128(11),
                quantity: Decimal::new(25, 1),
                applied_price: Decimal::new(9990, 2),
            }],
            total: Decimal::new(24975, 2),
            previous_hash: GENESIS_HASH.to_string(),
            issued_at: now,
        };

        let a = serde_json::to_string(&payload).unwrap();
        let b = serde_json::to_string(&payload).unwrap();
        assert_eq!(a, b);
        assert_eq!(chain_hash(&a), chain_hash(&b));
    }
}
