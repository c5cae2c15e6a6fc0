//! Application state for the Nutrition API service.

use std::sync::Arc;

use nutriq_analysis::AnalysisClient;
use nutriq_auth::AuthClient;
use nutriq_db::pg::{PgDeviceRepository, PgReferralRepository, PgTrialRepository, Repositories};
use nutriq_db::DbPool;
use nutriq_trial_core::TrialService;

use crate::config::Config;

/// Type alias for the trial service with concrete repository types
pub type TrialServiceImpl =
    TrialService<PgTrialRepository, PgReferralRepository, PgDeviceRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Identity provider client
    pub auth: Arc<AuthClient>,
    /// Trial/referral engine
    pub trial: Arc<TrialServiceImpl>,
    /// Classification service client
    pub analysis: Arc<AnalysisClient>,
    /// Database repositories
    pub repos: Repositories,
    /// Database pool (for health checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        auth: AuthClient,
        trial: TrialServiceImpl,
        analysis: AnalysisClient,
        repos: Repositories,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            trial: Arc::new(trial),
            analysis: Arc::new(analysis),
            repos,
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
