//! Presence-only household membership keyed by user id.

use serde_json::Value;
use tracing::debug;

use crate::{
    storage::{Document, HouseholdStore, WriteMode},
    CoreError,
};

pub struct MembershipService {
    store: HouseholdStore,
}

impl MembershipService {
    pub fn new(store: HouseholdStore) -> Self {
        Self { store }
    }

    pub async fn add_member(&self, user_id: &str) -> Result<(), CoreError> {
        let collection = self.store.paths().members();
        let mut mark = Document::new();
        mark.insert("member".into(), Value::Bool(true));
        self.store
            .store()
            .set(&collection, user_id, mark, WriteMode::Replace)
            .await?;
        debug!(user_id, household = self.store.paths().household_id(), "member added");
        Ok(())
    }

    /// Returns whether a membership was removed.
    pub async fn remove_member(&self, user_id: &str) -> Result<bool, CoreError> {
        let collection = self.store.paths().members();
        match self.store.store().delete(&collection, user_id).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn is_member(&self, user_id: &str) -> Result<bool, CoreError> {
        let collection = self.store.paths().members();
        Ok(self.store.store().get(&collection, user_id).await?.is_some())
    }
}
