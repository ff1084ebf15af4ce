use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Alert, NewAlert};

/// The process-wide alert collection.
///
/// Cloning the store clones the handle, not the records: the HTTP layer and
/// the alert monitor share one backing `Vec`, so a create, delete or toggle
/// is seen by the next monitor tick without any publish step.
#[derive(Clone, Default)]
pub struct AlertStore {
    inner: Arc<RwLock<Vec<Alert>>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, taken under the read lock.
    pub async fn current(&self) -> Vec<Alert> {
        self.inner.read().await.clone()
    }

    /// Install a new backing collection.
    pub async fn replace(&self, records: Vec<Alert>) {
        *self.inner.write().await = records;
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Alert> {
        self.inner.read().await.iter().find(|a| a.id == id).cloned()
    }

    /// Alerts owned by `user_id`, in creation order.
    pub async fn list(&self, user_id: &str) -> Vec<Alert> {
        self.inner
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn create(&self, new_alert: NewAlert) -> Alert {
        let alert = new_alert.into_alert();
        self.inner.write().await.push(alert.clone());
        alert
    }

    /// Returns false if no alert matches both `id` and `user_id`.
    pub async fn delete(&self, id: &str, user_id: &str) -> bool {
        let mut alerts = self.inner.write().await;
        match alerts.iter().position(|a| a.id == id && a.user_id == user_id) {
            Some(idx) => {
                alerts.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Flip `active`; returns the updated record.
    pub async fn toggle(&self, id: &str, user_id: &str) -> Option<Alert> {
        let mut alerts = self.inner.write().await;
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id && a.user_id == user_id)?;
        alert.active = !alert.active;
        Some(alert.clone())
    }
}
