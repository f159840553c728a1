// src/services/lead_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    dataverse::{LeadQuery, LeadStore},
    models::lead::{Lead, LeadPatch, RecordRef},
};

/// Thin orchestration over the lead store: argument preconditions are checked
/// here, before any network traffic, and then the call is delegated.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self, query: LeadQuery) -> Result<Vec<Lead>, AppError> {
        self.store.get_all(query).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Lead, AppError> {
        require(id, "id")?;
        self.store.get_by_id(id).await
    }

    pub async fn create(&self, patch: &LeadPatch) -> Result<String, AppError> {
        if patch.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(AppError::MissingField("name"));
        }
        self.store.create(patch).await
    }

    pub async fn update(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError> {
        require(id, "id")?;
        self.store.update(id, patch).await
    }

    pub async fn update_for_marketing(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError> {
        require(id, "id")?;
        self.store.update_for_marketing(id, patch).await
    }

    pub async fn reject(&self, id: &str) -> Result<(), AppError> {
        require(id, "id")?;
        self.store.reject(id).await
    }

    pub async fn save_customer(
        &self,
        target: &RecordRef,
        patch: &LeadPatch,
    ) -> Result<String, AppError> {
        if let RecordRef::Existing(id) = target {
            require(id, "id")?;
        }
        self.store.save_customer(target, patch).await
    }

    pub async fn mirror_to_lead(&self, id: &str, patch: &LeadPatch) {
        if id.trim().is_empty() {
            return;
        }
        self.store.mirror_to_lead(id, patch).await;
    }
}

fn require(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Double that fails the test if any remote call is reached: the
    /// precondition must stop the operation first.
    struct UnreachableStore;

    #[async_trait]
    impl LeadStore for UnreachableStore {
        async fn get_all(&self, _q: LeadQuery) -> Result<Vec<Lead>, AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn get_by_id(&self, _id: &str) -> Result<Lead, AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn create(&self, _p: &LeadPatch) -> Result<String, AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn update(&self, _id: &str, _p: &LeadPatch) -> Result<(), AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn update_for_marketing(&self, _id: &str, _p: &LeadPatch) -> Result<(), AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn reject(&self, _id: &str) -> Result<(), AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn save_customer(&self, _t: &RecordRef, _p: &LeadPatch) -> Result<String, AppError> {
            panic!("network call issued despite failed precondition");
        }
        async fn mirror_to_lead(&self, _id: &str, _p: &LeadPatch) {
            panic!("network call issued despite failed precondition");
        }
    }

    fn service() -> LeadService {
        LeadService::new(Arc::new(UnreachableStore))
    }

    #[tokio::test]
    async fn get_by_id_rejects_blank_id_before_any_call() {
        let err = service().get_by_id("  ").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField("id")));
    }

    #[tokio::test]
    async fn update_rejects_blank_id() {
        let err = service()
            .update("", &LeadPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("id")));
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let err = service().create(&LeadPatch::default()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField("name")));

        let err = service()
            .create(&LeadPatch {
                name: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("name")));
    }

    #[tokio::test]
    async fn existing_customer_ref_requires_an_id() {
        let err = service()
            .save_customer(&RecordRef::Existing(String::new()), &LeadPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField("id")));
    }
}
