use std::sync::Arc;

use courier_db::Services;

use crate::auth::AuthProvider;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(services: Services, auth: Arc<dyn AuthProvider>) -> Self {
        Self { services, auth }
    }
}
