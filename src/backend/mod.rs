pub mod selector;

pub use selector::{BackendSelector, PREFERENCE_KEY};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two interchangeable detection services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Primary,
    Secondary,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Primary => "primary",
            Backend::Secondary => "secondary",
        }
    }

    /// The alternate backend, used for failover.
    pub fn other(&self) -> Backend {
        match self {
            Backend::Primary => Backend::Secondary,
            Backend::Secondary => Backend::Primary,
        }
    }

    pub fn from_secondary_flag(use_secondary: bool) -> Backend {
        if use_secondary {
            Backend::Secondary
        } else {
            Backend::Primary
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(Backend::Primary),
            "secondary" => Ok(Backend::Secondary),
            other => Err(format!(
                "Unknown backend '{}'. Expected 'primary' or 'secondary'",
                other
            )),
        }
    }
}

/// Base URLs of the two backends, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoints {
    primary: String,
    secondary: String,
}

impl BackendEndpoints {
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: primary.trim_end_matches('/').to_string(),
            secondary: secondary.trim_end_matches('/').to_string(),
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    pub fn url(&self, backend: Backend) -> &str {
        match backend {
            Backend::Primary => &self.primary,
            Backend::Secondary => &self.secondary,
        }
    }
}
