// src/services/import.rs

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    common::{error::AppError, validation},
    models::lead::{Lead, LeadPatch, LeadSource},
};

use super::lead_service::LeadService;

/// The fixed, ordered import template. Column order is part of the contract
/// with the spreadsheet boundary.
pub const TEMPLATE_COLUMNS: [&str; 5] = [
    "Tên khách hàng",
    "Số điện thoại",
    "Địa chỉ",
    "Mã số thuế",
    "Nguồn",
];

/// Sheet row number of the first data row (row 1 is the header).
pub const FIRST_DATA_ROW: usize = 2;

/// One parsed data row, in template column order.
#[derive(Debug, Clone, Default)]
pub struct ImportRow {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub tax_code: String,
    pub source: String,
}

/// External boundary: the spreadsheet codec. Parsing and template generation
/// of the actual file format live outside this crate.
pub trait SpreadsheetPort: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<ImportRow>, AppError>;
    fn template(&self) -> Vec<u8>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// Sheet row number, header row included in the count.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<RowError>,
}

/// Sequential bulk create. Every row runs the same duplicate checks as a
/// single create; one row's failure never aborts the batch.
///
/// Duplicates are checked against the already-loaded lead list AND against
/// the rows created earlier in this batch (in-batch seen set), so a file
/// repeating one phone number yields one create and one row-cited failure.
#[derive(Clone)]
pub struct ImportService {
    service: Arc<LeadService>,
}

impl ImportService {
    pub fn new(service: Arc<LeadService>) -> Self {
        Self { service }
    }

    pub async fn import(&self, existing: &[Lead], rows: Vec<ImportRow>) -> ImportReport {
        let mut report = ImportReport::default();
        let mut seen_phones: HashSet<String> = HashSet::new();
        let mut seen_tax_codes: HashSet<String> = HashSet::new();

        for (index, row) in rows.into_iter().enumerate() {
            let sheet_row = FIRST_DATA_ROW + index;
            match self
                .import_row(existing, &mut seen_phones, &mut seen_tax_codes, &row)
                .await
            {
                Ok(()) => report.success += 1,
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(RowError {
                        row: sheet_row,
                        reason: e.to_string(),
                    });
                    // Rows are processed sequentially; keep going.
                }
            }
        }

        tracing::info!(
            success = report.success,
            failed = report.failed,
            "bulk import finished"
        );
        report
    }

    async fn import_row(
        &self,
        existing: &[Lead],
        seen_phones: &mut HashSet<String>,
        seen_tax_codes: &mut HashSet<String>,
        row: &ImportRow,
    ) -> Result<(), AppError> {
        if row.name.trim().is_empty() {
            return Err(AppError::MissingField("name"));
        }
        if row.phone.trim().is_empty() {
            return Err(AppError::MissingField("phone"));
        }

        let phone_key = validation::normalize_for_match(&row.phone);
        if let Some(conflict) = find_by_phone(existing, &phone_key) {
            return Err(AppError::DuplicatePhone {
                phone: row.phone.trim().to_string(),
                existing: conflict.name.clone(),
            });
        }
        if seen_phones.contains(&phone_key) {
            return Err(AppError::DuplicatePhone {
                phone: row.phone.trim().to_string(),
                existing: "dòng trước trong file".to_string(),
            });
        }

        let tax_key = validation::normalize_for_match(&row.tax_code);
        if !tax_key.is_empty() && tax_key != "n/a" {
            if let Some(conflict) = find_by_tax_code(existing, &tax_key) {
                return Err(AppError::DuplicateTaxCode {
                    tax_code: row.tax_code.trim().to_string(),
                    existing: conflict.name.clone(),
                });
            }
            if seen_tax_codes.contains(&tax_key) {
                return Err(AppError::DuplicateTaxCode {
                    tax_code: row.tax_code.trim().to_string(),
                    existing: "dòng trước trong file".to_string(),
                });
            }
        }

        // Canonicalize the source label ("FB" → "Facebook"); unknown labels
        // are imported without a source rather than rejected.
        let source = LeadSource::from_label(&row.source).map(|s| s.label().to_string());

        let patch = LeadPatch {
            name: Some(row.name.trim().to_string()),
            phone: Some(row.phone.trim().to_string()),
            address: non_empty(&row.address),
            tax_code: non_empty(&row.tax_code),
            source,
            ..Default::default()
        };

        self.service.create(&patch).await?;
        seen_phones.insert(phone_key);
        if !tax_key.is_empty() && tax_key != "n/a" {
            seen_tax_codes.insert(tax_key);
        }
        Ok(())
    }
}

pub fn find_by_phone<'a>(leads: &'a [Lead], normalized_phone: &str) -> Option<&'a Lead> {
    leads
        .iter()
        .find(|l| validation::normalize_for_match(&l.phone) == normalized_phone)
}

pub fn find_by_tax_code<'a>(leads: &'a [Lead], normalized_tax_code: &str) -> Option<&'a Lead> {
    leads
        .iter()
        .find(|l| validation::normalize_for_match(&l.tax_code) == normalized_tax_code)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
