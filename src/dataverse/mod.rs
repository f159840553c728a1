pub mod client;
pub mod lead_mapper;
pub mod lead_repo;
pub mod query;
pub mod reference_repo;

pub use client::DataverseClient;
pub use lead_repo::{LeadQuery, LeadRepository, LeadStore};
pub use query::QueryOptions;
pub use reference_repo::{ReferenceRepository, ReferenceStore};
