/// Application state
use crate::config::ServiceConfig;
use crate::errors::ApiError;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub service_config: ServiceConfig,
    pub postgres: Option<PgPool>,
}

impl AppState {
    pub fn new(service_config: ServiceConfig, postgres: Option<PgPool>) -> Self {
        Self {
            service_config,
            postgres,
        }
    }

    /// Data routes need a live pool; without one they answer 503.
    pub fn require_postgres(&self) -> Result<&PgPool, ApiError> {
        self.postgres
            .as_ref()
            .ok_or_else(|| ApiError::ServiceUnavailable {
                details: "database not available".to_string(),
            })
    }
}
