//! Suspension repository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sanction_common::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::suspension::{ActorReference, Suspension, SubjectReference};

/// Persistence for suspensions.
///
/// Records are inserted once and only changed by revocation, which must check
/// and write in one step so that concurrent revocations cannot both succeed.
/// Lookups return suspensions in insertion order, oldest first, regardless of
/// status.
#[async_trait]
pub trait SuspensionRepository: Send + Sync {
    /// Store a new suspension.
    async fn insert(&self, suspension: Suspension) -> AppResult<Suspension>;

    /// Revoke a stored suspension at `now`. Fails with a conflict if it is
    /// already revoked.
    async fn revoke(
        &self,
        id: &str,
        actor: Option<ActorReference>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Suspension>;

    /// Find a suspension by ID.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Suspension>>;

    /// Every suspension targeting `subject`.
    async fn find_by_subject(&self, subject: &SubjectReference) -> AppResult<Vec<Suspension>>;

    /// Every suspension with a criterion of `match_type`.
    async fn find_by_match_type(&self, match_type: &str) -> AppResult<Vec<Suspension>>;

    /// Every suspension with neither subject nor criterion.
    async fn find_global(&self) -> AppResult<Vec<Suspension>>;
}

#[derive(Debug, Default)]
struct Store {
    records: HashMap<String, Suspension>,
    order: Vec<String>,
}

impl Store {
    fn filtered(&self, predicate: impl Fn(&Suspension) -> bool) -> Vec<Suspension> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|s| predicate(*s))
            .cloned()
            .collect()
    }
}

/// In-process repository.
#[derive(Debug, Clone, Default)]
pub struct MemorySuspensionRepository {
    store: Arc<RwLock<Store>>,
}

impl MemorySuspensionRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored suspensions.
    pub async fn len(&self) -> usize {
        self.store.read().await.order.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.order.is_empty()
    }
}

#[async_trait]
impl SuspensionRepository for MemorySuspensionRepository {
    async fn insert(&self, suspension: Suspension) -> AppResult<Suspension> {
        let mut store = self.store.write().await;
        let id = suspension.id().to_string();
        if store.records.contains_key(&id) {
            return Err(AppError::Conflict(format!("Suspension {id} already exists")));
        }
        store.order.push(id.clone());
        store.records.insert(id, suspension.clone());
        Ok(suspension)
    }

    async fn revoke(
        &self,
        id: &str,
        actor: Option<ActorReference>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Suspension> {
        let mut store = self.store.write().await;
        let Some(suspension) = store.records.get_mut(id) else {
            return Err(AppError::SuspensionNotFound(id.to_string()));
        };
        suspension.revoke(actor, reason, now)?;
        Ok(suspension.clone())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Suspension>> {
        Ok(self.store.read().await.records.get(id).cloned())
    }

    async fn find_by_subject(&self, subject: &SubjectReference) -> AppResult<Vec<Suspension>> {
        Ok(self
            .store
            .read()
            .await
            .filtered(|s| s.subject() == Some(subject)))
    }

    async fn find_by_match_type(&self, match_type: &str) -> AppResult<Vec<Suspension>> {
        Ok(self
            .store
            .read()
            .await
            .filtered(|s| s.criterion().is_some_and(|c| c.match_type == match_type)))
    }

    async fn find_global(&self) -> AppResult<Vec<Suspension>> {
        Ok(self.store.read().await.filtered(Suspension::is_global))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::suspension::{EntityReference, MatchCriterion};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_718_193_600, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = MemorySuspensionRepository::new();
        assert!(repo.is_empty().await);

        let user = EntityReference::new("user", "1");
        repo.insert(Suspension::new("a", now()).with_subject(user.clone()))
            .await
            .unwrap();
        repo.insert(Suspension::new("b", now()).with_criterion(MatchCriterion::new("ip", "10.0.0.0/8")))
            .await
            .unwrap();
        repo.insert(Suspension::new("c", now())).await.unwrap();
        repo.insert(Suspension::new("d", now()).with_subject(user.clone()))
            .await
            .unwrap();

        assert_eq!(repo.len().await, 4);
        assert_eq!(repo.find_by_id("b").await.unwrap().unwrap().id(), "b");
        assert!(repo.find_by_id("z").await.unwrap().is_none());

        let ids: Vec<String> = repo
            .find_by_subject(&user)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "d"]);

        assert_eq!(repo.find_by_match_type("ip").await.unwrap().len(), 1);
        assert!(repo.find_by_match_type("email").await.unwrap().is_empty());

        let global = repo.find_global().await.unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].id(), "c");
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let repo = MemorySuspensionRepository::new();
        repo.insert(Suspension::new("a", now())).await.unwrap();
        let err = repo.insert(Suspension::new("a", now())).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_revoke() {
        let repo = MemorySuspensionRepository::new();
        repo.insert(Suspension::new("a", now()).with_reason("spam"))
            .await
            .unwrap();

        let admin = EntityReference::new("user", "admin");
        let revoked = repo
            .revoke("a", Some(admin.clone()), None, now())
            .await
            .unwrap();
        assert_eq!(revoked.revoked_at(), Some(now()));
        assert_eq!(revoked.reason(), Some("spam"));
        assert_eq!(repo.find_by_id("a").await.unwrap().unwrap(), revoked);

        let err = repo.revoke("missing", None, None, now()).await.unwrap_err();
        assert_eq!(err.error_code(), "SUSPENSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_second_revoke_leaves_first_intact() {
        let repo = MemorySuspensionRepository::new();
        repo.insert(Suspension::new("a", now())).await.unwrap();

        let first = EntityReference::new("user", "mod-a");
        let second = EntityReference::new("user", "mod-b");
        repo.revoke("a", Some(first.clone()), Some("A".to_string()), now())
            .await
            .unwrap();
        let err = repo
            .revoke(
                "a",
                Some(second),
                Some("B".to_string()),
                now() + Duration::minutes(5),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");

        let stored = repo.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(stored.revoked_by(), Some(&first));
        assert_eq!(stored.reason(), Some("A"));
        assert_eq!(stored.revoked_at(), Some(now()));
    }

    #[tokio::test]
    async fn test_concurrent_revokes_have_one_winner() {
        let repo = MemorySuspensionRepository::new();
        repo.insert(Suspension::new("a", now())).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    let actor = EntityReference::new("user", format!("mod-{i}"));
                    repo.revoke("a", Some(actor), Some(format!("reason {i}")), now())
                        .await
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(suspension) => winners.push(suspension),
                Err(e) => assert_eq!(e.error_code(), "CONFLICT"),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(repo.find_by_id("a").await.unwrap().unwrap(), winners[0]);
    }
}
