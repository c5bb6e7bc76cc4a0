//! Accession service
//!
//! Each operation loads the stored snapshot inside a transaction, applies one
//! model operation and writes the result back. The row returned by the write
//! is what the caller sees, never the in-memory copy.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::config::SeedbankConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::reference::ReferenceDataService;
use shared::{
    can_edit, can_modify, generate_accession_number, Accession, AccessionState, AccessionView,
    Clock, CollectionInfo, DomainResult, DryingDates, FieldErrorDetail, FieldErrors,
    NewViabilityTest, NewWithdrawal, ProcessingMethod, Quantity, RecordKey, Role, Section,
    StorageCondition, StorageInfo, TestDetails, TestType, WithdrawalAmount, WithdrawalPurpose,
};

#[derive(Clone)]
pub struct AccessionService {
    db: PgPool,
    clock: Arc<dyn Clock>,
}

/// An accession together with the projection the forms render from
#[derive(Debug, Serialize)]
pub struct AccessionResponse {
    pub accession: Accession,
    pub view: AccessionView,
    /// Fields that were not saved (future dates), the rest of the change went through
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldErrorDetail>,
}

/// Row of the accession list
#[derive(Debug, Serialize)]
pub struct AccessionSummary {
    pub id: Uuid,
    pub accession_number: String,
    pub state: AccessionState,
    pub species: Option<String>,
    pub remaining_quantity: Option<Quantity>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAccessionsQuery {
    pub state: Option<AccessionState>,
}

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CollectionInput {
    #[validate(length(min = 1, max = 200))]
    pub species: Option<String>,
    #[serde(default)]
    pub collectors: Vec<String>,
    pub collected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub site_location: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CollectionInput {
    fn into_info(self) -> CollectionInfo {
        CollectionInfo {
            species: self.species.map(|s| s.trim().to_string()),
            collectors: self
                .collectors
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            collected_date: self.collected_date,
            received_date: self.received_date,
            site_location: self.site_location,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccessionInput {
    /// Overrides the configured check-in requirement
    pub requires_check_in: Option<bool>,
    #[validate]
    pub collection: Option<CollectionInput>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessingMethodInput {
    pub method: ProcessingMethod,
}

#[derive(Debug, Deserialize)]
pub struct InitialQuantityInput {
    pub quantity: Quantity,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubsetInput {
    pub subset_weight: Option<Quantity>,
    #[validate(range(min = 1))]
    pub subset_count: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StorageInput {
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub condition: Option<StorageCondition>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawalInput {
    pub date: NaiveDate,
    pub purpose: WithdrawalPurpose,
    pub amount: WithdrawalAmount,
    #[validate(length(max = 200))]
    pub destination: Option<String>,
    #[validate(length(max = 200))]
    pub staff_responsible: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<WithdrawalInput> for NewWithdrawal {
    fn from(input: WithdrawalInput) -> Self {
        NewWithdrawal {
            date: input.date,
            purpose: input.purpose,
            amount: input.amount,
            destination: input.destination,
            staff_responsible: input.staff_responsible,
            notes: input.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WithdrawRemainingInput {
    /// Defaults to today
    pub date: Option<NaiveDate>,
    /// Defaults to the configured purpose
    pub purpose: Option<WithdrawalPurpose>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NurseryTransferInput {
    pub date: NaiveDate,
    pub amount: WithdrawalAmount,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ViabilityTestInput {
    pub test_type: TestType,
    #[validate(range(min = 1))]
    pub seeds_sown: u32,
    pub start_date: NaiveDate,
    pub remaining_quantity: Option<Quantity>,
    #[validate(length(max = 200))]
    pub substrate: Option<String>,
    #[validate(length(max = 200))]
    pub treatment: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<ViabilityTestInput> for NewViabilityTest {
    fn from(input: ViabilityTestInput) -> Self {
        NewViabilityTest {
            test_type: input.test_type,
            seeds_sown: input.seeds_sown,
            start_date: input.start_date,
            remaining_quantity: input.remaining_quantity,
            substrate: input.substrate,
            treatment: input.treatment,
            notes: input.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TestResultInput {
    pub recording_date: NaiveDate,
    pub seeds_germinated: u32,
}

// ============================================================================
// Edit gates
// ============================================================================

/// What the caller needs to be allowed before an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Change or remove an existing record in a section
    Modify(Section),
    /// Add a new record; also needs stock on hand
    Create(Section),
    CheckIn,
}

impl Gate {
    fn allows(self, accession: &Accession, role: Role, today: NaiveDate) -> bool {
        match self {
            Gate::Modify(section) => can_modify(accession, role, section),
            Gate::Create(section) => can_edit(accession, role, section, today),
            Gate::CheckIn => role != Role::Contributor,
        }
    }
}

fn settled(accession: Accession) -> (Accession, FieldErrors) {
    (accession, FieldErrors::new())
}

impl AccessionService {
    pub fn new(db: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn list(
        &self,
        user: &AuthUser,
        query: ListAccessionsQuery,
    ) -> AppResult<Vec<AccessionSummary>> {
        let rows = sqlx::query_as::<_, (Json<Accession>,)>(
            r#"
            SELECT snapshot
            FROM accessions
            WHERE organization_id = $1
              AND ($2::VARCHAR IS NULL OR state = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user.organization_id)
        .bind(query.state.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        let today = self.clock.today();
        Ok(rows
            .into_iter()
            .map(|(Json(accession),)| {
                let remaining_quantity = match accession.remaining_quantity(today) {
                    Ok(remaining) => remaining,
                    Err(e) => {
                        tracing::error!(
                            accession = %accession.accession_number,
                            error = %e,
                            "Stored withdrawal ledger does not balance"
                        );
                        None
                    }
                };
                AccessionSummary {
                    id: accession.id,
                    state: accession.state(),
                    remaining_quantity,
                    species: accession.collection.species.clone(),
                    accession_number: accession.accession_number,
                    updated_at: accession.updated_at,
                }
            })
            .collect())
    }

    pub async fn get(&self, user: &AuthUser, id: Uuid) -> AppResult<AccessionResponse> {
        let accession = self.load(user.organization_id, id).await?;
        Ok(Self::respond(accession, user.role, self.clock.today(), &FieldErrors::new()))
    }

    /// Current stored snapshot
    pub async fn load(&self, organization_id: Uuid, id: Uuid) -> AppResult<Accession> {
        let (Json(accession),) = sqlx::query_as::<_, (Json<Accession>,)>(
            "SELECT snapshot FROM accessions WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Accession".to_string()))?;

        Ok(accession)
    }

    // ------------------------------------------------------------------
    // Create / delete
    // ------------------------------------------------------------------

    pub async fn create(
        &self,
        user: &AuthUser,
        settings: &SeedbankConfig,
        input: CreateAccessionInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;

        if let Some(species) = input.collection.as_ref().and_then(|c| c.species.as_deref()) {
            ReferenceDataService::new(self.db.clone())
                .ensure_species(user.organization_id, species)
                .await?;
        }

        let now = self.clock.now();
        let today = now.date_naive();
        let mut tx = self.db.begin().await?;

        let sequence: i64 = sqlx::query_scalar("SELECT next_accession_sequence($1, $2)")
            .bind(user.organization_id)
            .bind(now.year())
            .fetch_one(&mut *tx)
            .await?;
        let number = generate_accession_number(&settings.accession_prefix, now.year(), sequence);

        let requires_check_in = input.requires_check_in.unwrap_or(settings.require_check_in);
        let accession = Accession::new(number, requires_check_in, now);
        let (accession, warnings) = match input.collection {
            Some(collection) => accession.update_collection(collection.into_info(), today, now),
            None => settled(accession),
        };

        let (Json(saved),) = sqlx::query_as::<_, (Json<Accession>,)>(
            r#"
            INSERT INTO accessions (id, organization_id, accession_number, state, species,
                                    snapshot, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING snapshot
            "#,
        )
        .bind(accession.id)
        .bind(user.organization_id)
        .bind(&accession.accession_number)
        .bind(accession.state().as_str())
        .bind(&accession.collection.species)
        .bind(Json(&accession))
        .bind(user.user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("accession_number".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        tx.commit().await?;

        tracing::info!(
            accession = %saved.accession_number,
            state = %saved.state(),
            "Accession created"
        );
        Ok(Self::respond(saved, user.role, today, &warnings))
    }

    pub async fn delete(&self, user: &AuthUser, id: Uuid) -> AppResult<()> {
        if !matches!(user.role, Role::Admin | Role::Owner) {
            return Err(AppError::Forbidden(
                "Only admins and owners can delete accessions".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM accessions WHERE id = $1 AND organization_id = $2")
            .bind(id)
            .bind(user.organization_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Accession".to_string()));
        }

        tracing::info!(accession_id = %id, "Accession deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Collection, check-in, processing, drying, storage
    // ------------------------------------------------------------------

    pub async fn check_in(&self, user: &AuthUser, id: Uuid) -> AppResult<AccessionResponse> {
        self.mutate(user, id, Gate::CheckIn, "check in", |a, _, now| {
            Ok(settled(a.check_in(now)))
        })
        .await
    }

    pub async fn update_collection(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: CollectionInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        if let Some(species) = input.species.as_deref() {
            ReferenceDataService::new(self.db.clone())
                .ensure_species(user.organization_id, species)
                .await?;
        }

        let info = input.into_info();
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Collection),
            "update collection",
            |a, today, now| Ok(a.update_collection(info, today, now)),
        )
        .await
    }

    pub async fn set_processing_method(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: ProcessingMethodInput,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Processing),
            "set processing method",
            |a, _, now| a.set_processing_method(input.method, now).map(settled),
        )
        .await
    }

    pub async fn record_initial_quantity(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: InitialQuantityInput,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Processing),
            "record initial quantity",
            |a, _, now| a.record_initial_quantity(input.quantity, now).map(settled),
        )
        .await
    }

    pub async fn record_subset(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: SubsetInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Processing),
            "record subset",
            |a, _, now| {
                a.record_subset(input.subset_weight, input.subset_count, now)
                    .map(settled)
            },
        )
        .await
    }

    pub async fn update_drying(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: DryingDates,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Drying),
            "update drying",
            |a, _, now| a.update_drying(input, now).map(settled),
        )
        .await
    }

    pub async fn update_storage(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: StorageInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        if let Some(location) = input.location.as_deref() {
            ReferenceDataService::new(self.db.clone())
                .ensure_storage_location(user.organization_id, location)
                .await?;
        }

        let storage = StorageInfo {
            location: input.location,
            start_date: input.start_date,
            condition: input.condition,
        };
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Storage),
            "update storage",
            |a, today, now| Ok(a.update_storage(storage, today, now)),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Withdrawals and nursery
    // ------------------------------------------------------------------

    pub async fn create_withdrawal(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: WithdrawalInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        let withdrawal = NewWithdrawal::from(input);
        let section = match withdrawal.purpose {
            WithdrawalPurpose::NurseryTransfer => Section::Nursery,
            _ => Section::Withdrawal,
        };
        self.mutate(
            user,
            id,
            Gate::Create(section),
            "create withdrawal",
            |a, _, now| a.apply_withdrawal(withdrawal, now).map(settled),
        )
        .await
    }

    pub async fn withdraw_remaining(
        &self,
        user: &AuthUser,
        id: Uuid,
        settings: &SeedbankConfig,
        input: WithdrawRemainingInput,
    ) -> AppResult<AccessionResponse> {
        let purpose = input
            .purpose
            .unwrap_or(settings.default_withdrawal_purpose);
        self.mutate(
            user,
            id,
            Gate::Create(Section::Withdrawal),
            "withdraw remaining",
            |a, today, now| {
                a.withdraw_remaining(input.date.unwrap_or(today), purpose, now)
                    .map(settled)
            },
        )
        .await
    }

    pub async fn edit_withdrawal(
        &self,
        user: &AuthUser,
        id: Uuid,
        key: RecordKey,
        input: WithdrawalInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        let withdrawal = NewWithdrawal::from(input);
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Withdrawal),
            "edit withdrawal",
            |a, _, now| a.edit_withdrawal(key, withdrawal, now).map(settled),
        )
        .await
    }

    pub async fn undo_withdrawal(
        &self,
        user: &AuthUser,
        id: Uuid,
        key: RecordKey,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Withdrawal),
            "undo withdrawal",
            |a, _, now| a.undo_withdrawal(key, now).map(settled),
        )
        .await
    }

    pub async fn transfer_to_nursery(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: NurseryTransferInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        self.mutate(
            user,
            id,
            Gate::Create(Section::Nursery),
            "transfer to nursery",
            |a, _, now| {
                a.transfer_to_nursery(input.date, input.amount, input.notes, now)
                    .map(settled)
            },
        )
        .await
    }

    pub async fn undo_send_to_nursery(
        &self,
        user: &AuthUser,
        id: Uuid,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::Nursery),
            "undo send to nursery",
            |a, _, now| a.undo_send_to_nursery(now).map(settled),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Viability tests
    // ------------------------------------------------------------------

    pub async fn create_viability_test(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: ViabilityTestInput,
    ) -> AppResult<AccessionResponse> {
        input.validate()?;
        let test = NewViabilityTest::from(input);
        self.mutate(
            user,
            id,
            Gate::Create(Section::ViabilityTesting),
            "create viability test",
            |a, _, now| a.create_viability_test(test, now).map(settled),
        )
        .await
    }

    pub async fn update_viability_test(
        &self,
        user: &AuthUser,
        id: Uuid,
        key: RecordKey,
        input: TestDetails,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::ViabilityTesting),
            "update viability test",
            |a, _, now| a.update_viability_test(key, input, now).map(settled),
        )
        .await
    }

    pub async fn delete_viability_test(
        &self,
        user: &AuthUser,
        id: Uuid,
        key: RecordKey,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::ViabilityTesting),
            "delete viability test",
            |a, _, now| a.delete_viability_test(key, now).map(settled),
        )
        .await
    }

    pub async fn record_test_result(
        &self,
        user: &AuthUser,
        id: Uuid,
        test_key: RecordKey,
        input: TestResultInput,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::ViabilityTesting),
            "record test result",
            |a, _, now| {
                a.record_test_result(test_key, input.recording_date, input.seeds_germinated, now)
                    .map(settled)
            },
        )
        .await
    }

    pub async fn update_test_result(
        &self,
        user: &AuthUser,
        id: Uuid,
        test_key: RecordKey,
        result_key: RecordKey,
        input: TestResultInput,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::ViabilityTesting),
            "update test result",
            |a, _, now| {
                a.update_test_result(
                    test_key,
                    result_key,
                    input.recording_date,
                    input.seeds_germinated,
                    now,
                )
                .map(settled)
            },
        )
        .await
    }

    pub async fn remove_test_result(
        &self,
        user: &AuthUser,
        id: Uuid,
        test_key: RecordKey,
        result_key: RecordKey,
    ) -> AppResult<AccessionResponse> {
        self.mutate(
            user,
            id,
            Gate::Modify(Section::ViabilityTesting),
            "remove test result",
            |a, _, now| a.remove_test_result(test_key, result_key, now).map(settled),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Load / apply / save
    // ------------------------------------------------------------------

    /// Run one model operation against the locked snapshot and persist it
    async fn mutate<F>(
        &self,
        user: &AuthUser,
        id: Uuid,
        gate: Gate,
        operation: &'static str,
        apply: F,
    ) -> AppResult<AccessionResponse>
    where
        F: FnOnce(&Accession, NaiveDate, DateTime<Utc>) -> DomainResult<(Accession, FieldErrors)>,
    {
        let mut tx = self.db.begin().await?;
        let current = Self::load_for_update(&mut tx, user.organization_id, id).await?;

        let now = self.clock.now();
        let today = now.date_naive();

        if !gate.allows(&current, user.role, today) {
            tracing::warn!(
                accession = %current.accession_number,
                operation,
                role = user.role.as_str(),
                state = %current.state(),
                "Operation not permitted"
            );
            return Err(AppError::Forbidden(format!(
                "Cannot {} while the accession is {}",
                operation,
                current.state()
            )));
        }

        let (next, warnings) = match apply(&current, today, now) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    accession = %current.accession_number,
                    operation,
                    error = %e,
                    "Mutation rejected"
                );
                return Err(e.into());
            }
        };

        let saved = Self::save(&mut tx, user.organization_id, &next).await?;
        tx.commit().await?;

        tracing::info!(
            accession = %saved.accession_number,
            operation,
            state = %saved.state(),
            "Accession updated"
        );
        Ok(Self::respond(saved, user.role, today, &warnings))
    }

    async fn load_for_update(
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        id: Uuid,
    ) -> AppResult<Accession> {
        let (Json(accession),) = sqlx::query_as::<_, (Json<Accession>,)>(
            "SELECT snapshot FROM accessions WHERE id = $1 AND organization_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Accession".to_string()))?;

        Ok(accession)
    }

    /// Persist the snapshot and hand back the stored copy
    async fn save(
        tx: &mut Transaction<'_, Postgres>,
        organization_id: Uuid,
        accession: &Accession,
    ) -> AppResult<Accession> {
        let (Json(saved),) = sqlx::query_as::<_, (Json<Accession>,)>(
            r#"
            UPDATE accessions
            SET state = $3, species = $4, snapshot = $5, updated_at = $6
            WHERE id = $1 AND organization_id = $2
            RETURNING snapshot
            "#,
        )
        .bind(accession.id)
        .bind(organization_id)
        .bind(accession.state().as_str())
        .bind(&accession.collection.species)
        .bind(Json(accession))
        .bind(accession.updated_at)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Accession".to_string()))?;

        Ok(saved)
    }

    fn respond(
        accession: Accession,
        role: Role,
        today: NaiveDate,
        warnings: &FieldErrors,
    ) -> AccessionResponse {
        let view = AccessionView::build(&accession, role, today);
        if let Some(error) = &view.balance_error {
            tracing::error!(
                accession = %accession.accession_number,
                error = %error,
                "Stored withdrawal ledger does not balance"
            );
        }
        AccessionResponse {
            accession,
            view,
            warnings: warnings.to_details(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn processed() -> Accession {
        Accession::new("SB-2024-00001", false, now())
            .set_processing_method(ProcessingMethod::Count, now())
            .unwrap()
            .record_initial_quantity(Quantity::seeds(10), now())
            .unwrap()
    }

    #[test]
    fn test_check_in_gate_excludes_contributors() {
        let accession = Accession::new("SB-2024-00002", true, now());
        let today = now().date_naive();
        assert!(!Gate::CheckIn.allows(&accession, Role::Contributor, today));
        assert!(Gate::CheckIn.allows(&accession, Role::Manager, today));
    }

    #[test]
    fn test_create_gate_needs_stock_but_modify_does_not() {
        let today = now().date_naive();
        let empty = processed()
            .withdraw_remaining(today, WithdrawalPurpose::Other, now())
            .unwrap();
        assert!(!Gate::Create(Section::Withdrawal).allows(&empty, Role::Manager, today));
        assert!(Gate::Modify(Section::Withdrawal).allows(&empty, Role::Manager, today));
    }

    #[test]
    fn test_collection_input_trims_collectors() {
        let input = CollectionInput {
            species: Some(" Acacia koa ".to_string()),
            collectors: vec!["  Kai ".to_string(), "   ".to_string()],
            collected_date: None,
            received_date: None,
            site_location: None,
            notes: None,
        };
        let info = input.into_info();
        assert_eq!(info.species.as_deref(), Some("Acacia koa"));
        assert_eq!(info.collectors, vec!["Kai".to_string()]);
    }

    #[test]
    fn test_zero_seeds_sown_fails_validation() {
        let input = ViabilityTestInput {
            test_type: TestType::Lab,
            seeds_sown: 0,
            start_date: now().date_naive(),
            remaining_quantity: None,
            substrate: None,
            treatment: None,
            notes: None,
        };
        assert!(input.validate().is_err());
    }
}
