pub mod lead_form;
pub mod lead_list;

pub use lead_form::{FieldAccess, FormField, LeadFormState};
pub use lead_list::LeadListController;
