// src/dataverse/lead_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadPatch, LeadStatus, RecordRef},
};

use super::{
    client::DataverseClient,
    lead_mapper::{
        self, CUSTOMER_ENTITY_SET, LEAD_COLUMNS, LEAD_ENTITY_SET,
    },
    query::QueryOptions,
};

/// Number of rows fetched when the caller gives no explicit paging. The UI
/// paginates client-side over this window.
pub const DEFAULT_FETCH_TOP: u32 = 200;

/// Read/write options for `get_all`. Defaults: fixed page size, newest first.
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
    pub filter: Option<String>,
    pub order_by: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
}

/// Port over the lead entity set. The production implementation talks OData;
/// tests substitute an in-memory double.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn get_all(&self, query: LeadQuery) -> Result<Vec<Lead>, AppError>;
    async fn get_by_id(&self, id: &str) -> Result<Lead, AppError>;
    async fn create(&self, patch: &LeadPatch) -> Result<String, AppError>;
    async fn update(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError>;

    /// Marketing's restricted update: only the allowed field subset is
    /// written, and the status is force-set to "Marketing đã xác nhận".
    async fn update_for_marketing(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError>;

    /// Marketing's reject: status becomes "Khách hàng không hợp tác".
    async fn reject(&self, id: &str) -> Result<(), AppError>;

    /// Sale's save against the full customer entity. The caller states
    /// explicitly whether the record exists; returns the customer id.
    async fn save_customer(&self, target: &RecordRef, patch: &LeadPatch) -> Result<String, AppError>;

    /// Best-effort mirror of a Sale edit back onto the originating lead.
    /// Failure is logged, never propagated.
    async fn mirror_to_lead(&self, id: &str, patch: &LeadPatch);
}

#[derive(Clone)]
pub struct LeadRepository {
    client: Arc<DataverseClient>,
}

impl LeadRepository {
    pub fn new(client: Arc<DataverseClient>) -> Self {
        Self { client }
    }

    fn row_path(id: &str) -> String {
        format!("{LEAD_ENTITY_SET}({id})")
    }
}

#[async_trait]
impl LeadStore for LeadRepository {
    async fn get_all(&self, query: LeadQuery) -> Result<Vec<Lead>, AppError> {
        let mut options = QueryOptions::new()
            .select(LEAD_COLUMNS)
            .top(query.top.unwrap_or(DEFAULT_FETCH_TOP))
            .order_by(
                query
                    .order_by
                    .unwrap_or_else(|| "createdon desc".to_string()),
            );
        if let Some(filter) = query.filter {
            options = options.filter(filter);
        }
        if let Some(skip) = query.skip {
            options = options.skip(skip);
        }

        let rows = self.client.get_list(LEAD_ENTITY_SET, &options).await?;
        Ok(rows.iter().map(lead_mapper::to_lead).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Lead, AppError> {
        let options = QueryOptions::new().select(LEAD_COLUMNS);
        let body = self.client.get(&Self::row_path(id), &options).await?;
        match body {
            Value::Object(row) => Ok(lead_mapper::to_lead(&row)),
            other => Err(AppError::Api {
                status: 200,
                message: format!("unexpected payload shape: {other}"),
            }),
        }
    }

    async fn create(&self, patch: &LeadPatch) -> Result<String, AppError> {
        let row = lead_mapper::to_remote(patch);
        self.client.post(LEAD_ENTITY_SET, &row).await
    }

    async fn update(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError> {
        let row = lead_mapper::to_remote(patch);
        self.client.patch(&Self::row_path(id), &row).await
    }

    async fn update_for_marketing(&self, id: &str, patch: &LeadPatch) -> Result<(), AppError> {
        let restricted = LeadPatch {
            name: patch.name.clone(),
            phone: patch.phone.clone(),
            tax_code: patch.tax_code.clone(),
            address: patch.address.clone(),
            district: patch.district.clone(),
            district_id: patch.district_id.clone(),
            city: patch.city.clone(),
            city_id: patch.city_id.clone(),
            status: Some(LeadStatus::MarketingConfirmed),
            ..Default::default()
        };
        let row = lead_mapper::to_remote(&restricted);
        self.client.patch(&Self::row_path(id), &row).await
    }

    async fn reject(&self, id: &str) -> Result<(), AppError> {
        let mut row = Map::new();
        row.insert(
            "crdfd_leadstatus".to_string(),
            Value::from(LeadStatus::NotCooperating.code().unwrap_or_default()),
        );
        self.client.patch(&Self::row_path(id), &row).await
    }

    async fn save_customer(&self, target: &RecordRef, patch: &LeadPatch) -> Result<String, AppError> {
        let row = lead_mapper::to_customer_remote(patch);
        match target {
            RecordRef::New => self.client.post(CUSTOMER_ENTITY_SET, &row).await,
            RecordRef::Existing(id) => {
                self.client
                    .patch(&format!("{CUSTOMER_ENTITY_SET}({id})"), &row)
                    .await?;
                Ok(id.clone())
            }
        }
    }

    async fn mirror_to_lead(&self, id: &str, patch: &LeadPatch) {
        if let Err(e) = self.update(id, patch).await {
            tracing::warn!(lead_id = %id, error = %e, "mirror to lead entity failed");
        }
    }
}
