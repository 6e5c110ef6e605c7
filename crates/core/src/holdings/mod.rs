//! Holdings module - domain models, import service, and traits.

mod holdings_errors;
mod holdings_model;
mod holdings_service;
mod holdings_traits;

#[cfg(test)]
mod holdings_service_tests;

pub use holdings_errors::ImportError;
pub use holdings_model::{
    decide_action, AccountType, BatchAction, BatchOperationTracker, BulkImportItemError,
    BulkImportSummary, DuplicateInfo, DuplicateStrategy, Holding, NewHolding,
};
pub use holdings_service::{check_duplicates, HoldingService};
pub use holdings_traits::{HoldingRepositoryTrait, HoldingServiceTrait};
