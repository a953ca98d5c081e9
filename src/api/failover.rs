//! Attempt planning for calls that may fail over to the alternate backend.
//!
//! A call either targets the active backend, in which case the alternate is
//! tried once if the first attempt fails, or a pinned backend with no
//! failover. Attempts stop at the first success. When all attempts fail, the
//! error from the last one is returned.

use std::future::Future;

use tracing::{error, info};

use crate::backend::{Backend, BackendEndpoints};
use crate::error::{NailedItError, Result};

/// Ordered list of backends to try, at most two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    backends: Vec<Backend>,
}

impl AttemptPlan {
    /// `pinned` disables failover and targets that backend only.
    pub fn new(active: Backend, pinned: Option<Backend>) -> Self {
        let backends = match pinned {
            Some(backend) => vec![backend],
            None => vec![active, active.other()],
        };
        Self { backends }
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn allows_failover(&self) -> bool {
        self.backends.len() > 1
    }
}

/// Run `attempt` against each backend base URL in `plan` until one succeeds.
pub(crate) async fn run<T, F, Fut>(
    plan: &AttemptPlan,
    endpoints: &BackendEndpoints,
    operation: &str,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for (index, backend) in plan.backends().iter().copied().enumerate() {
        let base = endpoints.url(backend).to_string();
        if index > 0 {
            info!("Trying {} backend for {}...", backend, operation);
        }

        match attempt(base.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                error!("Error with {} during {}: {}", base, operation, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        NailedItError::Config(format!("No backend available for {}", operation))
    }))
}
