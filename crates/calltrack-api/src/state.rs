//! Application state management

use calltrack_client::RemoteClient;
use calltrack_core::{Config, context_error, context_error::Result};
use calltrack_pages::{Connector, Services};
use std::sync::Arc;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Opens backend services per request
    pub connector: Arc<dyn Connector>,
}

impl AppState {
    /// State backed by the hosted backend named in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the remote client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = RemoteClient::new(&config.remote)
            .map_err(|e| context_error!("Failed to create remote client: {}", e))?;

        Ok(Self::with_connector(config, Arc::new(client)))
    }

    /// State backed by any connector
    pub fn with_connector(config: Config, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Services acting as the holder of `access_token`
    pub fn services(&self, access_token: Option<&str>) -> Arc<dyn Services> {
        self.connector.connect(access_token)
    }

    /// Check the configuration the handlers depend on
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| context_error!("Invalid configuration: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrack_pages::MockBackend;

    #[test]
    fn test_default_config_builds_remote_state() {
        let state = AppState::new(Config::default());
        assert!(state.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.security.page_size = 0;

        let state = AppState::with_connector(config, Arc::new(MockBackend::new()));
        assert!(state.validate().is_err());
    }
}
