// Headless client core for the lead-management CRM over Microsoft Dataverse.
//
// Layering, bottom-up: `models` (normalized records and vocabularies),
// `auth` (token store), `dataverse` (OData transport, field mapper,
// repositories), `services` (preconditions, lookup cache, bulk import),
// `app` (list controller and edit-form state consumed by the UI).

pub mod app;
pub mod auth;
pub mod common;
pub mod config;
pub mod dataverse;
pub mod models;
pub mod services;
