//! Domain models for holdings and the batch import run.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account type a holding sits in. Closed set; any other token is a
/// validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Specific,
    NisaGrowth,
    NisaTsumitate,
    NisaLegacy,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Specific => "specific",
            AccountType::NisaGrowth => "nisa_growth",
            AccountType::NisaTsumitate => "nisa_tsumitate",
            AccountType::NisaLegacy => "nisa_legacy",
        }
    }

    /// Parses the wire token; `None` for anything outside the closed set.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "specific" => Some(AccountType::Specific),
            "nisa_growth" => Some(AccountType::NisaGrowth),
            "nisa_tsumitate" => Some(AccountType::NisaTsumitate),
            "nisa_legacy" => Some(AccountType::NisaLegacy),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted holding, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub user_id: String,
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub shares: i64,
    pub acquisition_price: Option<Decimal>,
    pub account_type: AccountType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A candidate holding produced by the import pipeline.
///
/// `acquisition_price` is tri-state on the wire: absent (not provided),
/// explicit `null` (the export marked it unknown), or a value. Portfolio
/// valuation downstream treats absent and unknown differently, so the
/// distinction survives serialization via `double_option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub stock_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_name: Option<String>,
    pub shares: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_with::rust::double_option"
    )]
    pub acquisition_price: Option<Option<Decimal>>,
    pub account_type: AccountType,
}

impl NewHolding {
    /// Store payload shaping: trims the code and name, maps an empty name
    /// to absent. Applied once per row before insert/update.
    pub fn normalized(&self) -> NewHolding {
        let stock_name = self
            .stock_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        NewHolding {
            stock_code: self.stock_code.trim().to_string(),
            stock_name,
            shares: self.shares,
            acquisition_price: self.acquisition_price,
            account_type: self.account_type,
        }
    }
}

/// What to do with rows that collide with an existing holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStrategy {
    Skip,
    Overwrite,
}

/// One collision between a candidate row and an existing holding.
///
/// Derived per import run against the snapshot; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    pub row_index: usize,
    pub stock_code: String,
    pub account_type: AccountType,
    pub existing_holding_id: String,
}

/// A row-level failure inside a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportItemError {
    pub row: usize,
    pub reason: String,
}

/// Success summary of a batch import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<BulkImportItemError>,
}

/// Store action decided for one candidate row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Insert,
    Skip { existing_holding_id: String },
    Update { existing_holding_id: String },
}

/// Decides the store action for one row under the chosen strategy.
pub fn decide_action(
    duplicate: Option<&DuplicateInfo>,
    strategy: DuplicateStrategy,
) -> BatchAction {
    match duplicate {
        None => BatchAction::Insert,
        Some(info) => match strategy {
            DuplicateStrategy::Skip => BatchAction::Skip {
                existing_holding_id: info.existing_holding_id.clone(),
            },
            DuplicateStrategy::Overwrite => BatchAction::Update {
                existing_holding_id: info.existing_holding_id.clone(),
            },
        },
    }
}

/// Run-scoped mutation log for one batch import call.
///
/// Tracks inserted ids (in order) so a later failure can compensate by
/// deleting them. Updated ids are tracked for the summary only; they are
/// deliberately excluded from rollback. Created fresh per call, never
/// shared across runs.
#[derive(Debug, Default)]
pub struct BatchOperationTracker {
    inserted_ids: Vec<String>,
    updated_ids: Vec<String>,
    skipped_count: usize,
    errors: Vec<BulkImportItemError>,
}

impl BatchOperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_insert(&mut self, id: String) {
        self.inserted_ids.push(id);
    }

    pub fn track_update(&mut self, id: String) {
        self.updated_ids.push(id);
    }

    pub fn track_skip(&mut self) {
        self.skipped_count += 1;
    }

    pub fn track_error(&mut self, row: usize, reason: impl Into<String>) {
        self.errors.push(BulkImportItemError {
            row,
            reason: reason.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Ids to delete when compensating a failed run. Inserts only; updates
    /// are not reverted.
    pub fn inserted_ids_for_rollback(&self) -> &[String] {
        &self.inserted_ids
    }

    pub fn summary(&self) -> BulkImportSummary {
        BulkImportSummary {
            imported: self.inserted_ids.len() + self.updated_ids.len(),
            skipped: self.skipped_count,
            errors: self.errors.clone(),
        }
    }
}
