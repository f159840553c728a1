pub mod import;
pub mod lead_service;
pub mod lookup;

pub use import::{ImportReport, ImportRow, ImportService, RowError, SpreadsheetPort};
pub use lead_service::LeadService;
pub use lookup::LookupCache;
