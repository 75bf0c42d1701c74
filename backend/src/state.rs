//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::otp::OtpLedger;
use crate::auth::reset::ResetFlow;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::services::mailer::ResetMailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub reset: ResetFlow,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config, mailer: Arc<dyn ResetMailer>) -> Self {
        let config = Arc::new(config);
        let auth = AuthService::new(pool.clone(), config.clone());
        let ledger = OtpLedger::new(pool.clone(), config.otp_expiry_secs);
        let reset = ResetFlow::new(pool.clone(), ledger, mailer, config.otp_expiry_secs);
        AppState {
            pool,
            config,
            auth,
            reset,
        }
    }
}
