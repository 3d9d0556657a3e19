use serde::Serialize;
use tracing::{debug, warn};

use super::traits::EmailBackend;
use crate::constants::{HEALTH_FALLBACK_PATH, HEALTH_PATH};

/// What we currently believe about backend liveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BackendStatus {
    /// Not probed yet
    #[default]
    Checking,
    Online,
    Offline,
}

impl BackendStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Connecting...",
            Self::Online => "Backend Connected",
            Self::Offline => "Backend Offline",
        }
    }
}

/// Check if the backend is up, trying the primary path and then the fallback
pub async fn check_health(backend: &dyn EmailBackend) -> BackendStatus {
    match backend.probe(HEALTH_PATH).await {
        Ok(()) => return BackendStatus::Online,
        Err(e) => debug!("Health probe {} failed: {}", HEALTH_PATH, e),
    }

    match backend.probe(HEALTH_FALLBACK_PATH).await {
        Ok(()) => BackendStatus::Online,
        Err(e) => {
            warn!("Health probe {} failed: {}", HEALTH_FALLBACK_PATH, e);
            BackendStatus::Offline
        }
    }
}
