// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use crate::layout::LayoutConfig;
use crate::selection::AccumulatePolicy;
use crate::validation::SocketCompatibility;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration supplied by the embedding application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Layout parameters
    pub layout: LayoutConfig,
    /// Socket compatibility rules
    pub sockets: SocketCompatibility,
    /// Modifier that makes a click accumulate
    pub accumulate: AccumulatePolicy,
}

impl EditorConfig {
    /// Parse from RON
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

/// Error loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DirectionBias;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.layout.padding, 40.0);
        assert_eq!(config.layout.direction_bias, DirectionBias::LeftToRight);
        assert!(config.sockets.pairs.is_empty());
        assert_eq!(config.accumulate, AccumulatePolicy::OnCtrl);
    }

    #[test]
    fn test_partial_config() {
        let config = EditorConfig::from_ron(
            r#"(
                layout: (sibling_gap: 12.0, direction_bias: None),
                sockets: (pairs: [("number", "socket")]),
            )"#,
        )
        .unwrap();
        assert_eq!(config.layout.sibling_gap, 12.0);
        assert_eq!(config.layout.padding, 40.0);
        assert_eq!(config.layout.direction_bias, DirectionBias::None);
        assert!(config
            .sockets
            .is_compatible(&"number".into(), &"socket".into()));
    }

    #[test]
    fn test_serialization() {
        let mut config = EditorConfig::default();
        config.accumulate = AccumulatePolicy::OnShift;
        config.sockets = SocketCompatibility::identity().allow("a", "b");
        let ron_str = config.to_ron().unwrap();
        let loaded = EditorConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EditorConfig::from_ron("(layout: 3)"),
            Err(ConfigError::Parse(_))
        ));
    }
}
