use crate::error::Error;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_STAGES: usize = 32;

/// Limits applied by an [`ExpressionEngine`](crate::ExpressionEngine).
///
/// Loadable from JSON, for example `{ "maxStages": 8 }`; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// The most `|`-separated segments one expression may have.
    pub max_stages: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stages: DEFAULT_MAX_STAGES,
        }
    }
}

impl EngineConfig {
    pub fn from_json(source: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if config.max_stages == 0 {
            return Err(Error::InvalidConfig("maxStages must be at least 1".to_string()));
        }
        Ok(config)
    }
}
