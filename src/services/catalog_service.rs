// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{CandidateItem, Material, MaterialUnit, PriceComparison, TariffDocument},
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    // Identidade de serviço configurada; carimbada como created_by nas
    // linhas que o pipeline grava (nunca uma constante no código).
    service_identity: Uuid,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, service_identity: Uuid) -> Self {
        Self {
            catalog_repo,
            service_identity,
        }
    }

    /// Preço sugerido a partir do custo e da margem percentual.
    fn suggested_price(cost: Decimal, markup_pct: Decimal) -> Decimal {
        cost * (Decimal::ONE + markup_pct / Decimal::ONE_HUNDRED)
    }

    /// Monta o preview custo vs. preço sugerido para os itens extraídos.
    /// Transformação pura: nada é gravado aqui. Custo ausente ou ilegível
    /// entra como zero para o operador decidir na tela.
    pub fn build_comparison(items: &[CandidateItem], markup_pct: Decimal) -> Vec<PriceComparison> {
        items
            .iter()
            .map(|item| {
                let cost = item.price.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
                PriceComparison {
                    name: item.name.clone(),
                    unit: MaterialUnit::from_extracted(item.unit.as_deref().unwrap_or("")),
                    cost,
                    suggested_price: Self::suggested_price(cost, markup_pct),
                    current_price: None,
                    reference: item.reference.clone(),
                }
            })
            .collect()
    }

    /// Preview com o preço de catálogo atual de cada item (quando a chave
    /// natural já existe), para o operador ver o que a importação mudaria.
    pub async fn build_comparison_against_catalog<'e, E>(
        &self,
        executor: E,
        items: &[CandidateItem],
        supplier_id: Option<Uuid>,
        markup_pct: Decimal,
    ) -> Result<Vec<PriceComparison>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut preview = Self::build_comparison(items, markup_pct);
        for row in &mut preview {
            row.current_price = self
                .catalog_repo
                .find_cost_by_natural_key(&mut *tx, &row.name, supplier_id)
                .await?;
        }

        tx.commit().await?;
        Ok(preview)
    }

    /// Persiste os itens confirmados no catálogo. Tudo numa transação
    /// única: ou todos os itens entram, ou nenhum entra. A política é
    /// UPSERT pela chave (nome, fornecedor); re-importar atualiza preços.
    pub async fn import_candidates<'e, E>(
        &self,
        executor: E,
        items: &[CandidateItem],
        category: &str,
        supplier_id: Option<Uuid>,
        markup_pct: Decimal,
    ) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor
            .begin()
            .await
            .map_err(|e| AppError::ImportError(e.to_string()))?;

        let mut imported = Vec::with_capacity(items.len());
        for item in items {
            let cost = item.price.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
            let unit = MaterialUnit::from_extracted(item.unit.as_deref().unwrap_or(""));

            let material = self
                .catalog_repo
                .upsert_material(
                    &mut *tx,
                    item.name.trim(),
                    unit,
                    cost,
                    Some(category),
                    supplier_id,
                    Some(markup_pct),
                    item.reference.as_deref(),
                    self.service_identity,
                )
                .await
                .map_err(|e| AppError::ImportError(e.to_string()))?;

            imported.push(material);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::ImportError(e.to_string()))?;

        tracing::info!(
            total = imported.len(),
            category = category,
            "Itens importados para o catálogo"
        );
        Ok(imported)
    }

    // --- CRUD de materiais e tarifários (passagem direta ao repo) ---

    pub async fn create_material<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: MaterialUnit,
        cost_price: Decimal,
        category: Option<&str>,
        supplier_id: Option<Uuid>,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .create_material(
                executor,
                name,
                unit,
                cost_price,
                category,
                supplier_id,
                None,
                None,
                self.service_identity,
            )
            .await
    }

    pub async fn list_materials<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.get_all_materials(executor, search).await
    }

    pub async fn update_material<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        unit: Option<MaterialUnit>,
        cost_price: Option<Decimal>,
        category: Option<&str>,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .update_material(executor, id, name, unit, cost_price, category)
            .await
    }

    pub async fn register_tariff_document<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
        category: &str,
        storage_path: &str,
        file_name: &str,
    ) -> Result<TariffDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo
            .create_tariff_document(executor, supplier_id, category, storage_path, file_name)
            .await
    }

    pub async fn get_tariff_document<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<TariffDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.get_tariff_document(executor, id).await
    }

    pub async fn list_tariff_documents<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<TariffDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.get_all_tariff_documents(executor).await
    }

    pub async fn delete_tariff_document<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.catalog_repo.delete_tariff_document(executor, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, price: Option<&str>, unit: Option<&str>) -> CandidateItem {
        CandidateItem {
            name: name.to_string(),
            price: price.map(|p| p.parse().unwrap()),
            unit: unit.map(|u| u.to_string()),
            reference: None,
        }
    }

    #[test]
    fn suggested_price_applies_the_markup() {
        // custo 100.00 com 30% de margem -> 130.00
        let items = vec![candidate("Panel", Some("100.00"), Some("m2"))];
        let preview = CatalogService::build_comparison(&items, Decimal::new(30, 0));

        assert_eq!(preview[0].cost, Decimal::new(10000, 2));
        assert_eq!(preview[0].suggested_price, Decimal::new(130, 0));
    }

    #[test]
    fn zero_markup_keeps_the_cost() {
        let items = vec![candidate("Perfil", Some("42.50"), None)];
        let preview = CatalogService::build_comparison(&items, Decimal::ZERO);

        assert_eq!(preview[0].suggested_price, preview[0].cost);
    }

    #[test]
    fn missing_cost_is_treated_as_zero() {
        let items = vec![candidate("Sin precio", None, Some("kg"))];
        let preview = CatalogService::build_comparison(&items, Decimal::new(25, 0));

        assert_eq!(preview[0].cost, Decimal::ZERO);
        assert_eq!(preview[0].suggested_price, Decimal::ZERO);
        assert_eq!(preview[0].unit, MaterialUnit::Kilogram);
    }

    #[test]
    fn negative_cost_from_a_confused_model_is_clamped() {
        let items = vec![candidate("Raro", Some("-5.00"), None)];
        let preview = CatalogService::build_comparison(&items, Decimal::new(30, 0));

        assert_eq!(preview[0].cost, Decimal::ZERO);
    }

    #[test]
    fn comparison_preserves_item_order() {
        let items = vec![
            candidate("A", Some("1.00"), None),
            candidate("B", Some("2.00"), None),
            candidate("C", Some("3.00"), None),
        ];
        let preview = CatalogService::build_comparison(&items, Decimal::new(10, 0));

        let names: Vec<_> = preview.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
