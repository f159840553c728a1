// src/app/lead_list.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, validation},
    dataverse::LeadQuery,
    models::lead::{Department, Lead, LeadPatch, LeadStatus, RecordRef},
    services::{
        LeadService,
        import::{ImportReport, ImportRow, ImportService, find_by_phone, find_by_tax_code},
    },
};

/// Status sub-filter value meaning "no status restriction".
pub const ALL_STATUSES: &str = "--All--";

/// Leads shown per page in the table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Holds the full in-memory lead collection and the view state over it:
/// department axis, free-text/source filters, client-side pagination and the
/// current selection. Every successful write reconciles through a full
/// reload — the remote dataset is shared with concurrent editors, so the
/// optimistic local patch is never trusted on its own.
pub struct LeadListController {
    service: Arc<LeadService>,
    leads: Vec<Lead>,
    department: Option<Department>,
    status_filter: String,
    search: String,
    source_filter: Option<String>,
    page: usize,
    page_size: usize,
    selected: Option<String>,
}

impl LeadListController {
    pub fn new(service: Arc<LeadService>, page_size: usize) -> Self {
        Self {
            service,
            leads: Vec::new(),
            department: None,
            status_filter: ALL_STATUSES.to_string(),
            search: String::new(),
            source_filter: None,
            page: 1,
            page_size,
            selected: None,
        }
    }

    /// Replace the collection from Dataverse. Always clears the selection:
    /// the previously selected row may be gone or changed.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        self.leads = self.service.get_all(LeadQuery::default()).await?;
        self.selected = None;
        tracing::info!(count = self.leads.len(), "lead list reloaded");
        Ok(())
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn department(&self) -> Option<Department> {
        self.department
    }

    /// Explicit user action; the only way the axis changes once set.
    pub fn set_department(&mut self, department: Department) {
        self.department = Some(department);
        self.reset_view();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.reset_view();
    }

    pub fn set_source_filter(&mut self, source: Option<String>) {
        self.source_filter = source;
        self.reset_view();
    }

    /// Marketing's status sub-filter; `ALL_STATUSES` lifts it.
    pub fn set_status_filter(&mut self, status: impl Into<String>) {
        self.status_filter = status.into();
        self.reset_view();
    }

    fn reset_view(&mut self) {
        self.page = 1;
        self.selected = None;
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    // --- filtering pipeline ---

    /// Fixed, non-commutative order: department → free text → source.
    pub fn filtered(&self) -> Vec<&Lead> {
        let mut out: Vec<&Lead> = self.leads.iter().collect();

        match self.department {
            // Sale works only the marketing-confirmed queue.
            Some(Department::Sale) => {
                out.retain(|l| l.status == LeadStatus::MarketingConfirmed);
            }
            // Marketing sees everything, optionally narrowed by status. Both
            // awaiting spellings are one class here.
            Some(Department::Marketing) => {
                if self.status_filter != ALL_STATUSES {
                    let wanted = LeadStatus::from_label(&self.status_filter);
                    out.retain(|l| match wanted {
                        LeadStatus::Pending => l.status.is_pending(),
                        other => l.status == other,
                    });
                }
            }
            Some(Department::All) | None => {}
        }

        if !self.search.trim().is_empty() {
            let needle = self.search.trim().to_lowercase();
            out.retain(|l| {
                l.name.to_lowercase().contains(&needle) || l.phone.to_lowercase().contains(&needle)
            });
        }

        if let Some(source) = &self.source_filter {
            out.retain(|l| &l.source == source);
        }

        out
    }

    // --- pagination (client-side, over the filtered count) ---

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
        self.selected = None;
    }

    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.page_size)
    }

    /// The visible slice `[(page-1)*size, page*size)`. A page past the end
    /// yields an empty slice.
    pub fn page_slice(&self) -> Vec<&Lead> {
        let filtered = self.filtered();
        let start = (self.page - 1) * self.page_size;
        if start >= filtered.len() {
            return Vec::new();
        }
        let end = (start + self.page_size).min(filtered.len());
        filtered[start..end].to_vec()
    }

    // --- duplicate pre-checks ---

    fn check_duplicates(&self, patch: &LeadPatch) -> Result<(), AppError> {
        if let Some(phone) = &patch.phone {
            let key = validation::normalize_for_match(phone);
            if !key.is_empty() {
                if let Some(conflict) = find_by_phone(&self.leads, &key) {
                    return Err(AppError::DuplicatePhone {
                        phone: phone.trim().to_string(),
                        existing: conflict.name.clone(),
                    });
                }
            }
        }
        if let Some(tax_code) = &patch.tax_code {
            let key = validation::normalize_for_match(tax_code);
            if !key.is_empty() && key != "n/a" {
                if let Some(conflict) = find_by_tax_code(&self.leads, &key) {
                    return Err(AppError::DuplicateTaxCode {
                        tax_code: tax_code.trim().to_string(),
                        existing: conflict.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // --- write orchestration ---

    /// Create after both duplicate pre-checks pass; reconcile via reload.
    pub async fn create(&mut self, patch: LeadPatch) -> Result<String, AppError> {
        self.check_duplicates(&patch)?;
        let id = self.service.create(&patch).await?;
        self.reload().await?;
        Ok(id)
    }

    /// Marketing save: restricted field subset, status force-set remotely,
    /// then reload and close — the saved lead leaves the pending queue.
    pub async fn save_for_marketing(&mut self, id: &str, patch: LeadPatch) -> Result<(), AppError> {
        self.service.update_for_marketing(id, &patch).await?;
        self.reload().await?;
        self.close_detail();
        Ok(())
    }

    /// Sale save: writes the full customer record (create-or-update decided
    /// by the caller through `RecordRef`), then best-effort mirrors the edit
    /// back onto the lead. Mirror failure never fails the save.
    pub async fn save_for_sale(
        &mut self,
        lead_id: &str,
        customer: RecordRef,
        patch: LeadPatch,
    ) -> Result<String, AppError> {
        let customer_id = self.service.save_customer(&customer, &patch).await?;
        self.service.mirror_to_lead(lead_id, &patch).await;
        self.reload().await?;
        self.close_detail();
        Ok(customer_id)
    }

    /// Marketing reject: not-cooperating sentinel, reload, close.
    pub async fn reject(&mut self, id: &str) -> Result<(), AppError> {
        self.service.reject(id).await?;
        self.reload().await?;
        self.close_detail();
        Ok(())
    }

    /// Bulk import: rows run against the current collection plus the batch's
    /// own seen-set; the collection is reloaded once at the end regardless of
    /// per-row failures.
    pub async fn import(
        &mut self,
        importer: &ImportService,
        rows: Vec<ImportRow>,
    ) -> Result<ImportReport, AppError> {
        let report = importer.import(&self.leads, rows).await;
        self.reload().await?;
        Ok(report)
    }

    #[cfg(test)]
    pub(crate) fn set_leads_for_test(&mut self, leads: Vec<Lead>) {
        self.leads = leads;
    }
}
