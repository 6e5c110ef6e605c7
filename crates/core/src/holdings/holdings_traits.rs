use async_trait::async_trait;

use super::holdings_errors::ImportError;
use super::holdings_model::{
    BulkImportSummary, DuplicateInfo, DuplicateStrategy, Holding, NewHolding,
};
use crate::Result;

/// Trait defining the contract for holdings store operations.
///
/// The store is a remote service with per-call success/failure; it offers
/// no multi-row transaction, which is why the service layer compensates
/// manually.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// Fetches the user's current holdings snapshot.
    async fn get_holdings_by_user(&self, user_id: &str) -> Result<Vec<Holding>>;

    /// Inserts one holding and returns the new record's id.
    async fn insert_holding(&self, user_id: &str, holding: &NewHolding) -> Result<String>;

    /// Overwrites an existing holding in place.
    async fn update_holding(&self, holding_id: &str, user_id: &str, holding: &NewHolding)
        -> Result<()>;

    /// Deletes holdings by id. Best-effort; used only for compensation.
    async fn delete_holdings(&self, holding_ids: &[String]) -> Result<()>;
}

/// Trait defining the contract for holdings import service operations.
#[async_trait]
pub trait HoldingServiceTrait: Send + Sync {
    /// Preview: which candidate rows collide with already-persisted
    /// holdings. Mutates nothing.
    async fn check_import(
        &self,
        user_id: &str,
        holdings: &[NewHolding],
    ) -> Result<Vec<DuplicateInfo>>;

    /// Applies the batch as all-or-nothing (best effort): on a store
    /// failure every insert from this run is compensated away and the
    /// whole run reports failure. Fails closed when no user identity is
    /// present.
    async fn bulk_import_holdings(
        &self,
        user_id: Option<&str>,
        holdings: Vec<NewHolding>,
        strategy: DuplicateStrategy,
    ) -> std::result::Result<BulkImportSummary, ImportError>;
}
