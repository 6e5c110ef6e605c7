#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, Result};
    use crate::holdings::{
        AccountType, DuplicateStrategy, Holding, HoldingRepositoryTrait, HoldingService,
        HoldingServiceTrait, NewHolding,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    // --- Mock holdings store ---

    #[derive(Default)]
    struct MockState {
        holdings: Vec<Holding>,
        inserted_ids: Vec<String>,
        deleted_ids: Vec<String>,
        fetch_calls: usize,
        insert_calls: usize,
        update_calls: usize,
    }

    #[derive(Default)]
    struct MockHoldingRepository {
        state: Arc<Mutex<MockState>>,
        /// 1-based insert call number that fails, if any.
        fail_on_insert_call: Option<usize>,
        /// 1-based update call number that fails, if any.
        fail_on_update_call: Option<usize>,
        fail_fetch: bool,
        fail_delete: bool,
    }

    impl MockHoldingRepository {
        fn new() -> Self {
            Self::default()
        }

        fn with_existing(self, holdings: Vec<Holding>) -> Self {
            self.state.lock().unwrap().holdings = holdings;
            self
        }

        fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap()
        }
    }

    #[async_trait]
    impl HoldingRepositoryTrait for MockHoldingRepository {
        async fn get_holdings_by_user(&self, user_id: &str) -> Result<Vec<Holding>> {
            let mut state = self.state.lock().unwrap();
            state.fetch_calls += 1;
            if self.fail_fetch {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "connection refused".to_string(),
                )));
            }
            Ok(state
                .holdings
                .iter()
                .filter(|h| h.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert_holding(&self, user_id: &str, holding: &NewHolding) -> Result<String> {
            let mut state = self.state.lock().unwrap();
            state.insert_calls += 1;
            if self.fail_on_insert_call == Some(state.insert_calls) {
                return Err(Error::Database(DatabaseError::UniqueViolation(
                    "duplicate key".to_string(),
                )));
            }

            let id = Uuid::new_v4().to_string();
            state.holdings.push(Holding {
                id: id.clone(),
                user_id: user_id.to_string(),
                stock_code: holding.stock_code.clone(),
                stock_name: holding.stock_name.clone(),
                shares: holding.shares,
                acquisition_price: holding.acquisition_price.flatten(),
                account_type: holding.account_type,
                created_at: None,
                updated_at: None,
            });
            state.inserted_ids.push(id.clone());
            Ok(id)
        }

        async fn update_holding(
            &self,
            holding_id: &str,
            user_id: &str,
            holding: &NewHolding,
        ) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.update_calls += 1;
            if self.fail_on_update_call == Some(state.update_calls) {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "write timeout".to_string(),
                )));
            }

            let record = state
                .holdings
                .iter_mut()
                .find(|h| h.id == holding_id && h.user_id == user_id)
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(holding_id.to_string()))
                })?;
            record.stock_name = holding.stock_name.clone();
            record.shares = holding.shares;
            record.acquisition_price = holding.acquisition_price.flatten();
            record.account_type = holding.account_type;
            Ok(())
        }

        async fn delete_holdings(&self, holding_ids: &[String]) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if self.fail_delete {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "delete failed".to_string(),
                )));
            }
            state.deleted_ids.extend(holding_ids.iter().cloned());
            state.holdings.retain(|h| !holding_ids.contains(&h.id));
            Ok(())
        }
    }

    fn existing(code: &str, account_type: AccountType) -> Holding {
        Holding {
            id: format!("existing-{}", code),
            user_id: "user-1".to_string(),
            stock_code: code.to_string(),
            stock_name: None,
            shares: 100,
            acquisition_price: None,
            account_type,
            created_at: None,
            updated_at: None,
        }
    }

    fn candidate(code: &str) -> NewHolding {
        NewHolding {
            stock_code: code.to_string(),
            stock_name: Some("テスト銘柄".to_string()),
            shares: 100,
            acquisition_price: None,
            account_type: AccountType::Specific,
        }
    }

    /// 100 candidates with 4-digit codes 1000..1100.
    fn hundred_candidates() -> Vec<NewHolding> {
        (1000..1100).map(|code| candidate(&code.to_string())).collect()
    }

    /// Existing holdings colliding with the first `n` candidates.
    fn overlapping_existing(n: usize) -> Vec<Holding> {
        (1000..1000 + n)
            .map(|code| existing(&code.to_string(), AccountType::Specific))
            .collect()
    }

    fn service(repository: Arc<MockHoldingRepository>) -> HoldingService {
        HoldingService::new(repository)
    }

    #[tokio::test]
    async fn test_import_without_duplicates_inserts_all() {
        let repository = Arc::new(MockHoldingRepository::new());
        let summary = service(repository.clone())
            .bulk_import_holdings(
                Some("user-1"),
                vec![candidate("7203"), candidate("9104")],
                DuplicateStrategy::Skip,
            )
            .await
            .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 0);
        assert!(summary.errors.is_empty());
        assert_eq!(repository.state().insert_calls, 2);
        assert_eq!(repository.state().update_calls, 0);
    }

    #[tokio::test]
    async fn test_skip_strategy_with_ten_of_hundred_overlap() {
        let repository =
            Arc::new(MockHoldingRepository::new().with_existing(overlapping_existing(10)));
        let summary = service(repository.clone())
            .bulk_import_holdings(Some("user-1"), hundred_candidates(), DuplicateStrategy::Skip)
            .await
            .unwrap();

        assert_eq!(summary.imported, 90);
        assert_eq!(summary.skipped, 10);
        assert!(summary.errors.is_empty());
        assert_eq!(repository.state().insert_calls, 90);
        assert_eq!(repository.state().update_calls, 0);
    }

    #[tokio::test]
    async fn test_overwrite_strategy_updates_duplicates() {
        let repository =
            Arc::new(MockHoldingRepository::new().with_existing(overlapping_existing(10)));
        let summary = service(repository.clone())
            .bulk_import_holdings(
                Some("user-1"),
                hundred_candidates(),
                DuplicateStrategy::Overwrite,
            )
            .await
            .unwrap();

        assert_eq!(summary.imported, 100);
        assert_eq!(summary.skipped, 0);
        assert_eq!(repository.state().insert_calls, 90);
        assert_eq!(repository.state().update_calls, 10);
    }

    #[tokio::test]
    async fn test_insert_failure_compensates_prior_inserts() {
        let repository = Arc::new(MockHoldingRepository {
            fail_on_insert_call: Some(51),
            ..MockHoldingRepository::new()
        });
        let err = service(repository.clone())
            .bulk_import_holdings(Some("user-1"), hundred_candidates(), DuplicateStrategy::Skip)
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "database");
        assert!(err.to_string().contains("Row 50"));

        let state = repository.state();
        // Exactly the 50 prior inserts are rolled back, in order.
        assert_eq!(state.deleted_ids.len(), 50);
        assert_eq!(state.deleted_ids, state.inserted_ids);
        // Nothing from this run survives in the store.
        assert!(state.holdings.is_empty());
    }

    #[tokio::test]
    async fn test_update_failure_reverts_inserts_but_not_updates() {
        // Rows 0..10 are duplicates (updates under overwrite), the rest
        // are inserts. The second update fails after every insert and one
        // update already went through.
        let mut candidates = hundred_candidates();
        // Put the duplicates at the end so inserts happen first.
        candidates.rotate_left(10);
        let repository = Arc::new(
            MockHoldingRepository {
                fail_on_update_call: Some(2),
                ..MockHoldingRepository::new()
            }
            .with_existing(overlapping_existing(10)),
        );

        let err = service(repository.clone())
            .bulk_import_holdings(
                Some("user-1"),
                candidates,
                DuplicateStrategy::Overwrite,
            )
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "database");

        let state = repository.state();
        // All 90 inserts are compensated away...
        assert_eq!(state.deleted_ids.len(), 90);
        assert_eq!(state.deleted_ids, state.inserted_ids);
        // ...but the overwritten row keeps its new values: updates are
        // deliberately not reverted.
        let updated = state
            .holdings
            .iter()
            .find(|h| h.stock_code == "1000")
            .unwrap();
        assert_eq!(updated.stock_name.as_deref(), Some("テスト銘柄"));
    }

    #[tokio::test]
    async fn test_compensation_failure_keeps_original_error() {
        let repository = Arc::new(MockHoldingRepository {
            fail_on_insert_call: Some(3),
            fail_delete: true,
            ..MockHoldingRepository::new()
        });
        let err = service(repository.clone())
            .bulk_import_holdings(
                Some("user-1"),
                vec![candidate("7203"), candidate("9104"), candidate("6758")],
                DuplicateStrategy::Skip,
            )
            .await
            .unwrap_err();

        // The delete failed, but the reported error is still the insert's.
        assert_eq!(err.error_type(), "database");
        assert!(err.to_string().contains("Row 2"));
        assert!(repository.state().deleted_ids.is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_fails_closed() {
        let repository = Arc::new(MockHoldingRepository::new());
        let svc = service(repository.clone());

        for user_id in [None, Some(""), Some("   ")] {
            let err = svc
                .bulk_import_holdings(user_id, vec![candidate("7203")], DuplicateStrategy::Skip)
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), "unauthorized");
            assert_eq!(err.status_code(), 400);
        }

        // Fails before any store access.
        assert_eq!(repository.state().fetch_calls, 0);
        assert_eq!(repository.state().insert_calls, 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_validation_error() {
        let repository = Arc::new(MockHoldingRepository::new());
        let err = service(repository.clone())
            .bulk_import_holdings(Some("user-1"), Vec::new(), DuplicateStrategy::Skip)
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "validation");
        assert_eq!(repository.state().fetch_calls, 0);
    }

    #[tokio::test]
    async fn test_snapshot_fetch_failure_aborts_without_mutation() {
        let repository = Arc::new(MockHoldingRepository {
            fail_fetch: true,
            ..MockHoldingRepository::new()
        });
        let err = service(repository.clone())
            .bulk_import_holdings(Some("user-1"), vec![candidate("7203")], DuplicateStrategy::Skip)
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "database");
        assert_eq!(repository.state().insert_calls, 0);
        assert!(repository.state().deleted_ids.is_empty());
    }

    #[tokio::test]
    async fn test_payloads_are_normalized_before_insert() {
        let repository = Arc::new(MockHoldingRepository::new());
        let mut holding = candidate("7203");
        holding.stock_code = " 7203 ".to_string();
        holding.stock_name = Some("  ".to_string());

        service(repository.clone())
            .bulk_import_holdings(Some("user-1"), vec![holding], DuplicateStrategy::Skip)
            .await
            .unwrap();

        let state = repository.state();
        assert_eq!(state.holdings[0].stock_code, "7203");
        assert_eq!(state.holdings[0].stock_name, None);
    }

    #[tokio::test]
    async fn test_check_import_previews_without_mutation() {
        let repository = Arc::new(
            MockHoldingRepository::new()
                .with_existing(vec![existing("7203", AccountType::Specific)]),
        );
        let duplicates = service(repository.clone())
            .check_import("user-1", &[candidate("9104"), candidate("7203")])
            .await
            .unwrap();

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].row_index, 1);
        assert_eq!(duplicates[0].existing_holding_id, "existing-7203");
        assert_eq!(repository.state().insert_calls, 0);
        assert_eq!(repository.state().update_calls, 0);
    }

    #[tokio::test]
    async fn test_concurrent_runs_are_not_coordinated() {
        // Two runs for the same user race; the store's own unique
        // constraint is what surfaces, reported as a database error.
        let repository = Arc::new(MockHoldingRepository {
            fail_on_insert_call: Some(2),
            ..MockHoldingRepository::new()
        });
        let svc = Arc::new(service(repository.clone()));

        let first = {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.bulk_import_holdings(
                    Some("user-1"),
                    vec![candidate("7203")],
                    DuplicateStrategy::Skip,
                )
                .await
            })
        };
        let second = {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.bulk_import_holdings(
                    Some("user-1"),
                    vec![candidate("7203")],
                    DuplicateStrategy::Skip,
                )
                .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let failures = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(failures, 1);
        let err = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(err.error_type(), "database");
    }
}
