// src/services/lookup.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    dataverse::ReferenceStore,
    models::reference::{ChoiceOption, District, Employee, Province},
};

/// Free-text department value used to fetch the sales staff pickers.
pub const SALES_DEPARTMENT: &str = "Kinh doanh";

/// Session-scoped cache over the reference tables.
///
/// Policy, per table: fetch on first call, serve from memory afterwards;
/// a remote failure degrades to an empty (and uncached) list so reference
/// problems never block the lead workflow — callers must treat empty as
/// "unavailable", not as authoritative "no data". Concurrent first callers
/// may fetch twice; the tables are small and the reads idempotent.
pub struct LookupCache {
    store: Arc<dyn ReferenceStore>,
    districts: RwLock<Option<Arc<Vec<District>>>>,
    provinces: RwLock<Option<Arc<Vec<Province>>>>,
    employees: RwLock<HashMap<String, Arc<Vec<Employee>>>>,
    choices: RwLock<HashMap<(String, String), Arc<Vec<ChoiceOption>>>>,
}

impl LookupCache {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self {
            store,
            districts: RwLock::new(None),
            provinces: RwLock::new(None),
            employees: RwLock::new(HashMap::new()),
            choices: RwLock::new(HashMap::new()),
        }
    }

    pub async fn districts(&self) -> Arc<Vec<District>> {
        if let Some(cached) = self.districts.read().await.clone() {
            return cached;
        }
        match self.store.fetch_districts().await {
            Ok(list) => {
                let list = Arc::new(list);
                *self.districts.write().await = Some(list.clone());
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "district lookup unavailable");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn provinces(&self) -> Arc<Vec<Province>> {
        if let Some(cached) = self.provinces.read().await.clone() {
            return cached;
        }
        match self.store.fetch_provinces().await {
            Ok(list) => {
                let list = Arc::new(list);
                *self.provinces.write().await = Some(list.clone());
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "province lookup unavailable");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn employees(&self, department: Option<&str>) -> Arc<Vec<Employee>> {
        let key = department.unwrap_or_default().to_string();
        if let Some(cached) = self.employees.read().await.get(&key).cloned() {
            return cached;
        }
        match self.store.fetch_employees(department).await {
            Ok(list) => {
                let list = Arc::new(list);
                self.employees.write().await.insert(key, list.clone());
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "employee lookup unavailable");
                Arc::new(Vec::new())
            }
        }
    }

    /// Sales staff for one province. An empty province-specific result falls
    /// back to the full sales staff list: a picker is never left empty while
    /// a superset is available. The fallback is what gets returned, not
    /// cached under the province key.
    pub async fn sales_staff_for_province(&self, province_id: &str) -> Arc<Vec<Employee>> {
        let filtered = match self
            .store
            .fetch_employees_by_province(Some(SALES_DEPARTMENT), province_id)
            .await
        {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "province staff lookup unavailable");
                Vec::new()
            }
        };
        if filtered.is_empty() {
            return self.employees(Some(SALES_DEPARTMENT)).await;
        }
        Arc::new(filtered)
    }

    pub async fn choice_options(&self, entity: &str, attribute: &str) -> Arc<Vec<ChoiceOption>> {
        let key = (entity.to_string(), attribute.to_string());
        if let Some(cached) = self.choices.read().await.get(&key).cloned() {
            return cached;
        }
        match self.store.fetch_choice_options(entity, attribute).await {
            Ok(list) => {
                let list = Arc::new(list);
                self.choices.write().await.insert(key, list.clone());
                list
            }
            Err(e) => {
                tracing::warn!(error = %e, "choice options unavailable");
                Arc::new(Vec::new())
            }
        }
    }

    /// District → province one-hop join, served from the cached snapshot.
    pub async fn province_for_district(&self, district_id: &str) -> Option<(String, String)> {
        let districts = self.districts().await;
        districts.iter().find(|d| d.id == district_id).and_then(|d| {
            match (&d.province_id, &d.province_name) {
                (Some(id), Some(name)) => Some((id.clone(), name.clone())),
                _ => None,
            }
        })
    }

    /// Province → supervisor one-hop join.
    pub async fn supervisor_for_province(&self, province_id: &str) -> Option<String> {
        let provinces = self.provinces().await;
        provinces
            .iter()
            .find(|p| p.id == province_id)
            .and_then(|p| p.supervisor.clone())
    }

    /// Drop every cached table; the next calls refetch.
    pub async fn invalidate(&self) {
        *self.districts.write().await = None;
        *self.provinces.write().await = None;
        self.employees.write().await.clear();
        self.choices.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting double; optionally fails every call or returns an empty
    /// province-filtered staff list.
    struct FakeReferenceStore {
        calls: AtomicUsize,
        fail: bool,
        province_staff_empty: bool,
    }

    impl FakeReferenceStore {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                province_staff_empty: false,
            }
        }

        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn bump(&self) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Api {
                    status: 503,
                    message: "down".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ReferenceStore for FakeReferenceStore {
        async fn fetch_districts(&self) -> Result<Vec<District>, AppError> {
            self.bump()?;
            Ok(vec![District {
                id: "d1".to_string(),
                name: "Quận 1".to_string(),
                province_id: Some("p1".to_string()),
                province_name: Some("TP. Hồ Chí Minh".to_string()),
            }])
        }

        async fn fetch_provinces(&self) -> Result<Vec<Province>, AppError> {
            self.bump()?;
            Ok(vec![Province {
                id: "p1".to_string(),
                name: "TP. Hồ Chí Minh".to_string(),
                supervisor: Some("Trần Thị B".to_string()),
            }])
        }

        async fn fetch_employees(&self, _d: Option<&str>) -> Result<Vec<Employee>, AppError> {
            self.bump()?;
            Ok(vec![
                Employee {
                    id: "e1".to_string(),
                    name: "Lê Văn C".to_string(),
                    department: Some(SALES_DEPARTMENT.to_string()),
                    province_id: Some("p1".to_string()),
                },
                Employee {
                    id: "e2".to_string(),
                    name: "Phạm Thị D".to_string(),
                    department: Some(SALES_DEPARTMENT.to_string()),
                    province_id: Some("p2".to_string()),
                },
            ])
        }

        async fn fetch_employees_by_province(
            &self,
            _d: Option<&str>,
            province_id: &str,
        ) -> Result<Vec<Employee>, AppError> {
            self.bump()?;
            if self.province_staff_empty {
                return Ok(Vec::new());
            }
            Ok(vec![Employee {
                id: "e1".to_string(),
                name: "Lê Văn C".to_string(),
                department: Some(SALES_DEPARTMENT.to_string()),
                province_id: Some(province_id.to_string()),
            }])
        }

        async fn fetch_choice_options(
            &self,
            _e: &str,
            _a: &str,
        ) -> Result<Vec<ChoiceOption>, AppError> {
            self.bump()?;
            Ok(vec![ChoiceOption {
                value: 1,
                label: "Bán lẻ".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let store = Arc::new(FakeReferenceStore::new());
        let cache = LookupCache::new(store.clone());

        assert_eq!(cache.districts().await.len(), 1);
        assert_eq!(cache.districts().await.len(), 1);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let store = Arc::new(FakeReferenceStore::new());
        let cache = LookupCache::new(store.clone());

        cache.provinces().await;
        cache.invalidate().await;
        cache.provinces().await;
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn remote_failure_degrades_to_empty_and_is_not_cached() {
        let store = Arc::new(FakeReferenceStore {
            fail: true,
            ..FakeReferenceStore::new()
        });
        let cache = LookupCache::new(store.clone());

        assert!(cache.districts().await.is_empty());
        assert!(cache.districts().await.is_empty());
        // Both calls hit the store: failures are retried on the next access.
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn empty_province_staff_falls_back_to_full_list() {
        let store = Arc::new(FakeReferenceStore {
            province_staff_empty: true,
            ..FakeReferenceStore::new()
        });
        let cache = LookupCache::new(store.clone());

        let staff = cache.sales_staff_for_province("p1").await;
        assert_eq!(staff.len(), 2); // the unfiltered superset
    }

    #[tokio::test]
    async fn district_resolves_its_province_without_a_second_fetch() {
        let store = Arc::new(FakeReferenceStore::new());
        let cache = LookupCache::new(store.clone());

        let (id, name) = cache.province_for_district("d1").await.unwrap();
        assert_eq!(id, "p1");
        assert_eq!(name, "TP. Hồ Chí Minh");
        assert_eq!(store.count(), 1); // only the district fetch
    }

    #[tokio::test]
    async fn province_resolves_supervisor() {
        let cache = LookupCache::new(Arc::new(FakeReferenceStore::new()));
        assert_eq!(
            cache.supervisor_for_province("p1").await.as_deref(),
            Some("Trần Thị B")
        );
        assert_eq!(cache.supervisor_for_province("p9").await, None);
    }
}
