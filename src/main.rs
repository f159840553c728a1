// src/main.rs

use leaddesk::config::AppState;
use leaddesk::models::lead::Department;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() is right here: without configuration the application
    // cannot do anything useful.
    let mut state = AppState::new().expect("failed to assemble application state");

    // A token can be injected through the environment for headless use;
    // interactive login is an external concern.
    if let Ok(raw) = std::env::var("DATAVERSE_TOKEN") {
        if let Err(e) = state.token_store.store_raw(&raw) {
            tracing::error!(error = %e, "provided token could not be decoded");
            std::process::exit(1);
        }
    }

    if !state.token_store.is_valid() {
        tracing::error!("no valid token; set DATAVERSE_TOKEN or log in first");
        std::process::exit(1);
    }

    match state.token_store.identity() {
        Ok(identity) => tracing::info!(user = %identity.name, "signed in"),
        Err(e) => tracing::warn!(error = %e, "identity unavailable"),
    }

    if let Err(e) = state.controller.reload().await {
        tracing::error!(error = %e, "initial lead load failed");
        std::process::exit(1);
    }

    state.controller.set_department(Department::All);
    tracing::info!(
        total = state.controller.leads().len(),
        page_count = state.controller.page_count(),
        first_page = state.controller.page_slice().len(),
        "lead list ready"
    );
}
