//! Reference data: species, storage locations and collectors
//!
//! Accessions only refer to these by name; this service answers existence
//! checks and feeds the pick lists.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{validate_reference, StorageCondition, Unit, UNIT_TABLE};

#[derive(Clone)]
pub struct ReferenceDataService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Species {
    pub id: Uuid,
    pub scientific_name: String,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageLocation {
    pub id: Uuid,
    pub name: String,
    pub condition: StorageCondition,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Collector {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct UnitOption {
    pub unit: Unit,
    pub label: &'static str,
    pub symbol: &'static str,
    pub is_weight: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpeciesInput {
    #[validate(length(min = 1, max = 200))]
    pub scientific_name: String,
    #[validate(length(max = 200))]
    pub common_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStorageLocationInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub condition: StorageCondition,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectorInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

fn parse_condition(value: &str) -> StorageCondition {
    match value {
        "freezer" => StorageCondition::Freezer,
        _ => StorageCondition::Refrigerator,
    }
}

fn condition_str(condition: StorageCondition) -> &'static str {
    match condition {
        StorageCondition::Freezer => "freezer",
        StorageCondition::Refrigerator => "refrigerator",
    }
}

/// Map a unique-constraint violation to a duplicate entry error
fn map_unique(field: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::DuplicateEntry(field.to_string())
        }
        _ => AppError::DatabaseError(e),
    }
}

impl ReferenceDataService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_species(&self, organization_id: Uuid) -> AppResult<Vec<Species>> {
        let rows = sqlx::query_as::<_, Species>(
            r#"
            SELECT id, scientific_name, common_name
            FROM species
            WHERE organization_id = $1
            ORDER BY scientific_name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    pub async fn create_species(
        &self,
        organization_id: Uuid,
        input: CreateSpeciesInput,
    ) -> AppResult<Species> {
        input.validate()?;

        let row = sqlx::query_as::<_, Species>(
            r#"
            INSERT INTO species (organization_id, scientific_name, common_name)
            VALUES ($1, $2, $3)
            RETURNING id, scientific_name, common_name
            "#,
        )
        .bind(organization_id)
        .bind(input.scientific_name.trim())
        .bind(&input.common_name)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique("scientific_name"))?;

        tracing::info!(species = %row.scientific_name, "Species added");
        Ok(row)
    }

    pub async fn list_storage_locations(
        &self,
        organization_id: Uuid,
    ) -> AppResult<Vec<StorageLocation>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            SELECT id, name, condition
            FROM storage_locations
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StorageLocation {
                id: r.0,
                name: r.1,
                condition: parse_condition(&r.2),
            })
            .collect())
    }

    pub async fn create_storage_location(
        &self,
        organization_id: Uuid,
        input: CreateStorageLocationInput,
    ) -> AppResult<StorageLocation> {
        input.validate()?;

        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            INSERT INTO storage_locations (organization_id, name, condition)
            VALUES ($1, $2, $3)
            RETURNING id, name, condition
            "#,
        )
        .bind(organization_id)
        .bind(input.name.trim())
        .bind(condition_str(input.condition))
        .fetch_one(&self.db)
        .await
        .map_err(map_unique("name"))?;

        tracing::info!(location = %row.1, "Storage location added");
        Ok(StorageLocation {
            id: row.0,
            name: row.1,
            condition: parse_condition(&row.2),
        })
    }

    pub async fn list_collectors(&self, organization_id: Uuid) -> AppResult<Vec<Collector>> {
        let rows = sqlx::query_as::<_, Collector>(
            r#"
            SELECT id, name
            FROM collectors
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    pub async fn create_collector(
        &self,
        organization_id: Uuid,
        input: CreateCollectorInput,
    ) -> AppResult<Collector> {
        input.validate()?;

        let row = sqlx::query_as::<_, Collector>(
            r#"
            INSERT INTO collectors (organization_id, name)
            VALUES ($1, $2)
            RETURNING id, name
            "#,
        )
        .bind(organization_id)
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique("name"))?;

        Ok(row)
    }

    /// Units offered by quantity inputs
    pub fn list_units(&self) -> Vec<UnitOption> {
        UNIT_TABLE
            .iter()
            .map(|info| UnitOption {
                unit: info.unit,
                label: info.label,
                symbol: info.symbol,
                is_weight: info.unit.is_weight(),
            })
            .collect()
    }

    /// The species must exist before an accession can name it
    pub async fn ensure_species(&self, organization_id: Uuid, name: &str) -> AppResult<()> {
        let known: Vec<String> = self
            .list_species(organization_id)
            .await?
            .into_iter()
            .map(|s| s.scientific_name)
            .collect();
        validate_reference("species", name, &known)?;
        Ok(())
    }

    /// The storage location must exist before seeds are put there
    pub async fn ensure_storage_location(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> AppResult<()> {
        let known: Vec<String> = self
            .list_storage_locations(organization_id)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();
        validate_reference("storage_location", name, &known)?;
        Ok(())
    }
}
