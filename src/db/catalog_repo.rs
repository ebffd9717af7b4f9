// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{Material, MaterialUnit, TariffDocument},
};

const MATERIAL_COLUMNS: &str = "id, name, unit, cost_price, category, supplier_id, \
     markup_pct, reference, created_by, created_at, updated_at";

const TARIFF_COLUMNS: &str = "id, supplier_id, category, storage_path, file_name, uploaded_at";

// Sentinela usada no índice único (name, supplier) quando não há fornecedor.
const NO_SUPPLIER: &str = "'00000000-0000-0000-0000-000000000000'::uuid";

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MATERIAIS
    // =========================================================================

    pub async fn create_material<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: MaterialUnit,
        cost_price: Decimal,
        category: Option<&str>,
        supplier_id: Option<Uuid>,
        markup_pct: Option<Decimal>,
        reference: Option<&str>,
        created_by: Uuid,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO materials
                (name, unit, cost_price, category, supplier_id, markup_pct, reference, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {MATERIAL_COLUMNS}"
        );
        let material = sqlx::query_as::<_, Material>(&query)
            .bind(name)
            .bind(unit)
            .bind(cost_price)
            .bind(category)
            .bind(supplier_id)
            .bind(markup_pct)
            .bind(reference)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(material)
    }

    /// UPSERT pela chave natural (nome, fornecedor): re-importar um
    /// tarifário atualizado sobrescreve preço, categoria, unidade e margem
    /// em vez de duplicar a linha. Atômico, sem janela de corrida.
    pub async fn upsert_material<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: MaterialUnit,
        cost_price: Decimal,
        category: Option<&str>,
        supplier_id: Option<Uuid>,
        markup_pct: Option<Decimal>,
        reference: Option<&str>,
        created_by: Uuid,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO materials
                (name, unit, cost_price, category, supplier_id, markup_pct, reference, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (name, COALESCE(supplier_id, {NO_SUPPLIER}))
             DO UPDATE SET
                unit = EXCLUDED.unit,
                cost_price = EXCLUDED.cost_price,
                category = EXCLUDED.category,
                markup_pct = EXCLUDED.markup_pct,
                reference = EXCLUDED.reference,
                updated_at = NOW()
             RETURNING {MATERIAL_COLUMNS}"
        );
        let material = sqlx::query_as::<_, Material>(&query)
            .bind(name)
            .bind(unit)
            .bind(cost_price)
            .bind(category)
            .bind(supplier_id)
            .bind(markup_pct)
            .bind(reference)
            .bind(created_by)
            .fetch_one(executor)
            .await?;

        Ok(material)
    }

    pub async fn get_all_materials<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materials = match search {
            Some(term) => {
                let query = format!(
                    "SELECT {MATERIAL_COLUMNS} FROM materials
                     WHERE name ILIKE $1 OR category ILIKE $1
                     ORDER BY name ASC"
                );
                sqlx::query_as::<_, Material>(&query)
                    .bind(format!("%{term}%"))
                    .fetch_all(executor)
                    .await?
            }
            None => {
                let query = format!("SELECT {MATERIAL_COLUMNS} FROM materials ORDER BY name ASC");
                sqlx::query_as::<_, Material>(&query)
                    .fetch_all(executor)
                    .await?
            }
        };
        Ok(materials)
    }

    pub async fn get_material<'e, E>(&self, executor: E, id: Uuid) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1");
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::MaterialNotFound)
    }

    /// Preço de catálogo atual para a chave natural, se já houver linha.
    pub async fn find_cost_by_natural_key<'e, E>(
        &self,
        executor: E,
        name: &str,
        supplier_id: Option<Uuid>,
    ) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT cost_price FROM materials
             WHERE name = $1
               AND COALESCE(supplier_id, {NO_SUPPLIER}) = COALESCE($2, {NO_SUPPLIER})"
        );
        let row: Option<(Decimal,)> = sqlx::query_as(&query)
            .bind(name)
            .bind(supplier_id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(|(cost,)| cost))
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
        let query = format!(
            "UPDATE materials SET
                name = COALESCE($2, name),
                unit = COALESCE($3, unit),
                cost_price = COALESCE($4, cost_price),
                category = COALESCE($5, category),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {MATERIAL_COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .bind(name)
            .bind(unit)
            .bind(cost_price)
            .bind(category)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::MaterialNotFound)
    }

    pub async fn count_materials<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM materials")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    // =========================================================================
    //  TARIFÁRIOS
    // =========================================================================

    pub async fn create_tariff_document<'e, E>(
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
        let query = format!(
            "INSERT INTO tariff_documents (supplier_id, category, storage_path, file_name)
             VALUES ($1, $2, $3, $4)
             RETURNING {TARIFF_COLUMNS}"
        );
        let doc = sqlx::query_as::<_, TariffDocument>(&query)
            .bind(supplier_id)
            .bind(category)
            .bind(storage_path)
            .bind(file_name)
            .fetch_one(executor)
            .await?;

        Ok(doc)
    }

    pub async fn get_tariff_document<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<TariffDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {TARIFF_COLUMNS} FROM tariff_documents WHERE id = $1");
        sqlx::query_as::<_, TariffDocument>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::TariffNotFound)
    }

    pub async fn get_all_tariff_documents<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<TariffDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query =
            format!("SELECT {TARIFF_COLUMNS} FROM tariff_documents ORDER BY uploaded_at DESC");
        let docs = sqlx::query_as::<_, TariffDocument>(&query)
            .fetch_all(executor)
            .await?;
        Ok(docs)
    }

    pub async fn delete_tariff_document<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tariff_documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::TariffNotFound);
        }
        Ok(())
    }
}
