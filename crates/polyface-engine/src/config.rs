//! Engine selection.
//!
//! # Environment Variables
//!
//! - `POLYFACE_DISPATCH`: `"direct"` or `"cached"` (default: `"cached"`)
use crate::{cached::CachedDispatcher, direct::DirectDispatcher, Dispatcher};
use serde::{Deserialize, Serialize};
use std::{env, sync::Arc};
use tracing::warn;

pub const DISPATCH_MODE_ENV: &str = "POLYFACE_DISPATCH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    Direct,
    #[default]
    Cached,
}

impl DispatchMode {
    fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "cached" => Some(Self::Cached),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: DispatchMode,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_value(env::var(DISPATCH_MODE_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let mode = match value {
            None => DispatchMode::default(),
            Some(raw) => DispatchMode::from_str(raw).unwrap_or_else(|| {
                warn!(
                    value = raw,
                    "unrecognized {}, using the cached engine",
                    DISPATCH_MODE_ENV
                );
                DispatchMode::default()
            }),
        };
        Self { mode }
    }

    pub fn build(&self) -> Arc<dyn Dispatcher> {
        match self.mode {
            DispatchMode::Direct => Arc::new(DirectDispatcher::new()),
            DispatchMode::Cached => Arc::new(CachedDispatcher::new()),
        }
    }
}
