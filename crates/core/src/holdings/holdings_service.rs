//! Duplicate resolution and the batch import executor.

use async_trait::async_trait;
use log::{debug, error};
use std::collections::HashMap;
use std::sync::Arc;

use super::holdings_errors::ImportError;
use super::holdings_model::{
    decide_action, AccountType, BatchAction, BatchOperationTracker, BulkImportSummary,
    DuplicateInfo, DuplicateStrategy, Holding, NewHolding,
};
use super::holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
use crate::Result;

/// Flags candidate rows that collide with existing holdings.
///
/// The duplicate key is `(stock_code, account_type)`. The index over
/// existing holdings is last-write-wins; the store's own uniqueness
/// constraint makes genuine key duplicates in the snapshot impossible.
/// O(existing + candidates).
pub fn check_duplicates(
    new_holdings: &[NewHolding],
    existing_holdings: &[Holding],
) -> Vec<DuplicateInfo> {
    let mut existing_by_key: HashMap<(&str, AccountType), &Holding> = HashMap::new();
    for holding in existing_holdings {
        existing_by_key.insert((holding.stock_code.as_str(), holding.account_type), holding);
    }

    let mut duplicates = Vec::new();
    for (row_index, candidate) in new_holdings.iter().enumerate() {
        let key = (candidate.stock_code.as_str(), candidate.account_type);
        if let Some(existing) = existing_by_key.get(&key) {
            duplicates.push(DuplicateInfo {
                row_index,
                stock_code: candidate.stock_code.clone(),
                account_type: candidate.account_type,
                existing_holding_id: existing.id.clone(),
            });
        }
    }

    duplicates
}

/// Service for importing holdings in bulk.
pub struct HoldingService {
    holding_repository: Arc<dyn HoldingRepositoryTrait>,
}

impl HoldingService {
    /// Creates a new HoldingService instance with an injected repository.
    pub fn new(holding_repository: Arc<dyn HoldingRepositoryTrait>) -> Self {
        Self { holding_repository }
    }

    /// Compensates a failed run by deleting every id inserted so far.
    ///
    /// Updates are intentionally left in place: the pre-existing row
    /// survives whether or not the overwrite is undone. A failing delete
    /// is logged and otherwise ignored; the run's original error stands.
    async fn rollback_inserts(&self, tracker: &BatchOperationTracker) {
        let ids = tracker.inserted_ids_for_rollback();
        if ids.is_empty() {
            return;
        }

        match self.holding_repository.delete_holdings(ids).await {
            Ok(()) => error!("bulk import rolled back {} inserted holdings", ids.len()),
            Err(err) => error!(
                "bulk import rollback failed for {} holdings: {}",
                ids.len(),
                err
            ),
        }
    }
}

#[async_trait]
impl HoldingServiceTrait for HoldingService {
    async fn check_import(
        &self,
        user_id: &str,
        holdings: &[NewHolding],
    ) -> Result<Vec<DuplicateInfo>> {
        let existing = self.holding_repository.get_holdings_by_user(user_id).await?;
        Ok(check_duplicates(holdings, &existing))
    }

    async fn bulk_import_holdings(
        &self,
        user_id: Option<&str>,
        holdings: Vec<NewHolding>,
        strategy: DuplicateStrategy,
    ) -> std::result::Result<BulkImportSummary, ImportError> {
        // No identity, no import: fail closed before touching the store.
        let user_id = match user_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(ImportError::Unauthorized(
                    "Authentication required.".to_string(),
                ))
            }
        };

        if holdings.is_empty() {
            return Err(ImportError::Validation(
                "holdings array must not be empty.".to_string(),
            ));
        }

        // Snapshot fetch failure aborts before any mutation; nothing to
        // compensate at this point.
        let existing = self
            .holding_repository
            .get_holdings_by_user(user_id)
            .await
            .map_err(|err| ImportError::Database(err.to_string()))?;

        let duplicates = check_duplicates(&holdings, &existing);
        let duplicate_by_row: HashMap<usize, &DuplicateInfo> =
            duplicates.iter().map(|dup| (dup.row_index, dup)).collect();

        let mut tracker = BatchOperationTracker::new();

        for (row_index, holding) in holdings.iter().enumerate() {
            let action = decide_action(duplicate_by_row.get(&row_index).copied(), strategy);
            let payload = holding.normalized();

            match action {
                BatchAction::Skip { .. } => tracker.track_skip(),
                BatchAction::Insert => {
                    match self.holding_repository.insert_holding(user_id, &payload).await {
                        Ok(id) => tracker.track_insert(id),
                        Err(err) => {
                            tracker.track_error(row_index, err.to_string());
                            self.rollback_inserts(&tracker).await;
                            return Err(ImportError::Database(format!(
                                "Row {}: {}",
                                row_index, err
                            )));
                        }
                    }
                }
                BatchAction::Update {
                    existing_holding_id,
                } => {
                    match self
                        .holding_repository
                        .update_holding(&existing_holding_id, user_id, &payload)
                        .await
                    {
                        Ok(()) => tracker.track_update(existing_holding_id),
                        Err(err) => {
                            tracker.track_error(row_index, err.to_string());
                            self.rollback_inserts(&tracker).await;
                            return Err(ImportError::Database(format!(
                                "Row {}: {}",
                                row_index, err
                            )));
                        }
                    }
                }
            }
        }

        let summary = tracker.summary();
        debug!(
            "bulk import completed: {} imported, {} skipped",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }
}
