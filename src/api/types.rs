//! Shared types for the API layer.

use std::sync::Arc;

use crate::auth::{AccountClaims, WorkerClaims};
use crate::state::AppState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub app: Arc<AppState>,
}

impl ApiContext {
    pub fn new(app: Arc<AppState>) -> Self {
        Self { app }
    }
}

/// Authenticated account identity, injected into request extensions by the
/// account-token middleware.
#[derive(Debug, Clone)]
pub struct AccountContext {
    pub account: AccountClaims,
}

/// Authenticated worker identity, injected into request extensions by the
/// worker-token middleware.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub worker: WorkerClaims,
}
