use crate::services::lock_service::TransitionPolicy;
use std::env;
use tracing::warn;

/// Approval-workflow configuration.
///
/// `LOCK_TRANSITION_POLICY=guarded` enforces the documented transition
/// table; anything else (including unset) keeps the permissive behavior
/// the deployed clients were built against.
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub policy: TransitionPolicy,
}

impl LockConfig {
    pub fn from_env() -> Self {
        let policy = match env::var("LOCK_TRANSITION_POLICY") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!(
                    "Unknown LOCK_TRANSITION_POLICY {:?}; falling back to relaxed",
                    value
                );
                TransitionPolicy::Relaxed
            }),
            Err(_) => TransitionPolicy::Relaxed,
        };

        LockConfig { policy }
    }
}
