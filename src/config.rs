// src/config.rs

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    app::LeadListController,
    auth::{FileTokenStorage, TokenStore},
    dataverse::{DataverseClient, LeadRepository, ReferenceRepository},
    services::{ImportService, LeadService, LookupCache},
};

/// Environment-backed settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Organization URL, e.g. `https://org.crm5.dynamics.com`.
    pub dataverse_url: String,
    /// Web API version segment, e.g. `v9.2`.
    pub api_version: String,
    pub page_size: usize,
    /// Where the token cache lives on disk.
    pub token_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let dataverse_url = env::var("DATAVERSE_URL")
            .map_err(|_| anyhow::anyhow!("DATAVERSE_URL must be set"))?;
        let api_version = env::var("DATAVERSE_API_VERSION").unwrap_or_else(|_| "v9.2".to_string());
        let page_size = env::var("PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(crate::app::lead_list::DEFAULT_PAGE_SIZE);
        let token_path = env::var("TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".leaddesk/token.json"));

        Ok(Self {
            dataverse_url,
            api_version,
            page_size,
            token_path,
        })
    }
}

/// The assembled dependency graph. Everything is constructed exactly once
/// here and handed down by reference; no component looks anything up in a
/// global registry.
pub struct AppState {
    pub config: AppConfig,
    pub token_store: Arc<TokenStore>,
    pub lookup: Arc<LookupCache>,
    pub lead_service: Arc<LeadService>,
    pub importer: ImportService,
    pub controller: LeadListController,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let token_store = Arc::new(TokenStore::new(Arc::new(FileTokenStorage::new(
            config.token_path.clone(),
        ))));

        let client = Arc::new(DataverseClient::new(
            config.dataverse_url.clone(),
            config.api_version.clone(),
            token_store.clone(),
        ));

        let lead_service = Arc::new(LeadService::new(Arc::new(LeadRepository::new(
            client.clone(),
        ))));
        let lookup = Arc::new(LookupCache::new(Arc::new(ReferenceRepository::new(client))));
        let importer = ImportService::new(lead_service.clone());
        let controller = LeadListController::new(lead_service.clone(), config.page_size);

        tracing::info!(url = %config.dataverse_url, "application state assembled");

        Ok(Self {
            config,
            token_store,
            lookup,
            lead_service,
            importer,
            controller,
        })
    }
}
