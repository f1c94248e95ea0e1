use serde::{Deserialize, Serialize};

/// Configuration for [`ViewHierarchy`](crate::ViewHierarchy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// When `true`, an action that does not fit the hierarchy fails with a
    /// [`RenderError`](crate::RenderError). When `false`, it is logged and
    /// skipped.
    pub strict: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl RenderConfig {
    /// A configuration that skips actions it cannot apply.
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict() {
        assert!(RenderConfig::default().strict);
        assert!(!RenderConfig::lenient().strict);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: RenderConfig = toml::from_str("").unwrap();
        assert_eq!(config, RenderConfig::default());

        let config: RenderConfig = toml::from_str("strict = false").unwrap();
        assert_eq!(config, RenderConfig::lenient());
    }
}
