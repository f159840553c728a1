pub mod auth;
pub mod lead;
pub mod reference;

pub use auth::{RoleContext, StoredToken, TokenClaims, UserIdentity};
pub use lead::{Department, Lead, LeadPatch, LeadSource, LeadStatus, RecordRef};
pub use reference::{ChoiceOption, District, Employee, Province};
