// src/services/project_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CrmRepository, ProjectsRepository},
    models::projects::{
        BudgetItem, Project, ProjectDetail, ProjectStatus, TimelineEntry, TimelineKind,
    },
    services::notification_service::NotificationService,
};

/// Linha pedida na montagem do orçamento. O preço aplicado pode divergir
/// do preço de catálogo; quando ausente, usamos custo + margem.
pub struct QuoteLineInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub applied_price: Option<Decimal>,
}

#[derive(Clone)]
pub struct ProjectService {
    projects_repo: ProjectsRepository,
    crm_repo: CrmRepository,
    catalog_repo: CatalogRepository,
    notifier: NotificationService,
}

impl ProjectService {
    pub fn new(
        projects_repo: ProjectsRepository,
        crm_repo: CrmRepository,
        catalog_repo: CatalogRepository,
        notifier: NotificationService,
    ) -> Self {
        Self {
            projects_repo,
            crm_repo,
            catalog_repo,
            notifier,
        }
    }

    pub async fn create_project<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        title: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Garante que o cliente existe antes de abrir a obra.
        self.crm_repo.get_client(&mut *tx, client_id).await?;
        let project = self
            .projects_repo
            .create_project(&mut *tx, client_id, title)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn list_projects<'e, E>(&self, executor: E) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.projects_repo.get_all_projects(executor).await
    }

    pub async fn get_detail<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        public_only: bool,
    ) -> Result<ProjectDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let header = self.projects_repo.get_project(&mut *tx, project_id).await?;
        let client = self.crm_repo.get_client(&mut *tx, header.client_id).await?;
        let items = self
            .projects_repo
            .list_budget_items(&mut *tx, project_id)
            .await?;
        let timeline = self
            .projects_repo
            .list_timeline(&mut *tx, project_id, public_only)
            .await?;

        tx.commit().await?;

        Ok(ProjectDetail {
            header,
            client_name: client.full_name,
            items,
            timeline,
        })
    }

    /// Monta o orçamento: grava as linhas, totaliza e move LEAD -> QUOTE,
    /// tudo numa transação. As linhas ficam somente leitura depois disso.
    pub async fn assemble_quote<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        lines: Vec<QuoteLineInput>,
        margin_pct: Decimal,
    ) -> Result<ProjectDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let project = self.projects_repo.get_project(&mut *tx, project_id).await?;
        if project.status != ProjectStatus::Lead {
            return Err(AppError::InvalidTransition(format!(
                "orçamento só pode ser montado em LEAD (estado atual: {:?})",
                project.status
            )));
        }
        let existing = self
            .projects_repo
            .count_budget_items(&mut *tx, project_id)
            .await?;
        if existing > 0 {
            return Err(AppError::QuoteAlreadyAssembled);
        }

        let mut total = Decimal::ZERO;
        let mut items: Vec<BudgetItem> = Vec::with_capacity(lines.len());
        for line in &lines {
            let material = self
                .catalog_repo
                .get_material(&mut *tx, line.material_id)
                .await?;

            // Preço aplicado explícito vence; senão, custo + margem.
            let applied_price = line.applied_price.unwrap_or_else(|| {
                material.cost_price * (Decimal::ONE + margin_pct / Decimal::ONE_HUNDRED)
            });

            let item = self
                .projects_repo
                .add_budget_item(
                    &mut *tx,
                    project_id,
                    line.material_id,
                    line.quantity,
                    applied_price,
                    margin_pct,
                )
                .await?;
            total += item.quantity * item.applied_price;
            items.push(item);
        }

        self.projects_repo
            .set_quote_total(&mut *tx, project_id, total)
            .await?;
        let header = self
            .projects_repo
            .update_status(&mut *tx, project_id, ProjectStatus::Quote)
            .await?;
        let client = self.crm_repo.get_client(&mut *tx, header.client_id).await?;
        let timeline = self
            .projects_repo
            .list_timeline(&mut *tx, project_id, false)
            .await?;

        tx.commit().await?;

        tracing::info!(obra = %project_id, total = %total, "Orçamento montado");
        Ok(ProjectDetail {
            header,
            client_name: client.full_name,
            items,
            timeline,
        })
    }

    /// Transição manual do funil, sempre validada pela máquina de estados.
    pub async fn transition<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        target: ProjectStatus,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let project = self.projects_repo.get_project(&mut *tx, project_id).await?;
        if !project.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "{:?} -> {:?}",
                project.status, target
            )));
        }

        let updated = self
            .projects_repo
            .update_status(&mut *tx, project_id, target)
            .await?;

        // Obra concluída fecha a barra de progresso sozinha.
        let updated = if target == ProjectStatus::Completed && updated.completion_pct < 100 {
            self.projects_repo
                .update_progress(&mut *tx, project_id, 100)
                .await?
        } else {
            updated
        };

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn update_progress<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        completion_pct: i16,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.projects_repo
            .update_progress(executor, project_id, completion_pct)
            .await
    }

    pub async fn append_timeline<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        kind: TimelineKind,
        body: &str,
        is_public: bool,
    ) -> Result<TimelineEntry, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A obra precisa existir; a linha do tempo não tem órfãos.
        self.projects_repo.get_project(&mut *tx, project_id).await?;
        let entry = self
            .projects_repo
            .append_timeline_entry(&mut *tx, project_id, kind, body, is_public)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Aprovação vinda do portal: registra IP, user agent, instante e
    /// método, avança QUOTE -> IN_PROGRESS e deixa um marco público na
    /// linha do tempo. O aviso por e-mail é best-effort: se o provedor
    /// falhar, a aprovação continua valendo e o erro fica no log.
    pub async fn approve_from_portal<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        client_id: Uuid,
        ip: &str,
        user_agent: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let project = self.projects_repo.get_project(&mut *tx, project_id).await?;
        // O token só dá acesso às obras do próprio cliente.
        if project.client_id != client_id {
            return Err(AppError::ProjectNotFound);
        }
        let client = self.crm_repo.get_client(&mut *tx, client_id).await?;

        let approved = self
            .projects_repo
            .record_approval(&mut *tx, project_id, Utc::now(), ip, user_agent, "portal")
            .await?;

        self.projects_repo
            .append_timeline_entry(
                &mut *tx,
                project_id,
                TimelineKind::Milestone,
                "Orçamento aprovado pelo cliente através do portal.",
                true,
            )
            .await?;

        tx.commit().await?;

        if let Err(e) = self
            .notifier
            .notify_quote_approved(&approved.title, &client.full_name)
            .await
        {
            tracing::warn!("Aviso de aprovação não enviado: {}", e);
        }

        Ok(approved)
    }

    pub async fn set_technical_memo<'e, E>(
        &self,
        executor: E,
        project_id: Uuid,
        memo: &str,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.projects_repo
            .set_technical_memo(executor, project_id, memo)
            .await
    }

    pub async fn projects_for_client<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
    ) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.projects_repo
            .get_projects_by_client(executor, client_id)
            .await
    }
}
