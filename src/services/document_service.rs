// src/services/document_service.rs

use genpdf::{Element, elements, style};
use image::Luma;
use qrcode::QrCode;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CrmRepository, InvoiceRepository, ProjectsRepository, SettingsRepository},
};

#[derive(Clone)]
pub struct DocumentService {
    invoice_repo: InvoiceRepository,
    projects_repo: ProjectsRepository,
    crm_repo: CrmRepository,
    catalog_repo: CatalogRepository,
    settings_repo: SettingsRepository,
}

impl DocumentService {
    pub fn new(
        invoice_repo: InvoiceRepository,
        projects_repo: ProjectsRepository,
        crm_repo: CrmRepository,
        catalog_repo: CatalogRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self {
            invoice_repo,
            projects_repo,
            crm_repo,
            catalog_repo,
            settings_repo,
        }
    }

    pub async fn generate_invoice_pdf<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
    ) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Busca os dados
        let invoice = self.invoice_repo.get_invoice(&mut *tx, invoice_id).await?;
        let project = self
            .projects_repo
            .get_project(&mut *tx, invoice.project_id)
            .await?;
        let client = self.crm_repo.get_client(&mut *tx, project.client_id).await?;
        let items = self
            .projects_repo
            .list_budget_items(&mut *tx, invoice.project_id)
            .await?;
        let settings = self.settings_repo.get_settings(&mut *tx).await?;

        struct LinePrintData {
            name: String,
            quantity: rust_decimal::Decimal,
            price: rust_decimal::Decimal,
            total: rust_decimal::Decimal,
        }

        let mut print_lines = Vec::with_capacity(items.len());
        for item in items {
            let material = self
                .catalog_repo
                .get_material(&mut *tx, item.material_id)
                .await?;
            print_lines.push(LinePrintData {
                name: material.name,
                quantity: item.quantity,
                price: item.applied_price,
                total: item.quantity * item.applied_price,
            });
        }

        tx.commit().await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Fatura {}", invoice.number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        let title_text = settings
            .company_name
            .unwrap_or("ODEPLAC PRO".to_string());
        doc.push(
            elements::Paragraph::new(title_text)
                .styled(style::Style::new().bold().with_font_size(18)),
        );

        if let Some(doc_num) = settings.document_number {
            doc.push(
                elements::Paragraph::new(format!("NIF: {}", doc_num))
                    .styled(style::Style::new().with_font_size(10)),
            );
        }

        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("FATURA {}", invoice.number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            invoice.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!("Cliente: {}", client.full_name)));
        doc.push(elements::Paragraph::new(format!("Obra: {}", project.title)));

        doc.push(elements::Break::new(2));

        // --- TABELA DE LINHAS ---
        // Pesos das colunas: Material (4), Qtd (1), Preço (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Material").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        for line in print_lines {
            table
                .row()
                .element(elements::Paragraph::new(line.name))
                .element(elements::Paragraph::new(format!("{:.2}", line.quantity)))
                .element(elements::Paragraph::new(format!("€ {:.2}", line.price)))
                .element(elements::Paragraph::new(format!("€ {:.2}", line.total)))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAL ---
        let mut total_paragraph =
            elements::Paragraph::new(format!("TOTAL: € {:.2}", project.quote_total));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));

        // --- VERIFICAÇÃO (QR CODE) ---
        // O QR carrega número + prefixo do hash; quem recebe a fatura
        // consegue conferir contra a cadeia.
        doc.push(
            elements::Paragraph::new("VERIFICAÇÃO")
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        doc.push(elements::Paragraph::new(format!("Hash: {}", invoice.content_hash)));
        doc.push(elements::Break::new(1));

        let code = QrCode::new(invoice.qr_payload.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        // Renderiza para imagem
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);

        // --- RODAPÉ ---
        if let Some(addr) = settings.address {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new(addr).styled(style::Style::new().italic().with_font_size(8)),
            );
        }

        // 3. Renderiza para buffer (memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
