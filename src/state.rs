use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::Store;

/// Shared handler state: the record store, token issuer and configuration
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tokens = TokenIssuer::from_config(&config.security);
        Self {
            store,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}
