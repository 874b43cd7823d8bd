//! Engine configuration for the command line.

use darkroom_core::EngineConfig;

/// Flags that override the environment-derived [`EngineConfig`].
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Longest edge of the editing proxy, in pixels
    #[arg(long, value_name = "PIXELS")]
    pub max_proxy_edge: Option<u32>,

    /// History entries kept per image
    #[arg(long, value_name = "N")]
    pub max_history: Option<usize>,

    /// Skip the GPU and render with the reduced renderer
    #[arg(long)]
    pub fallback: bool,
}

impl ConfigArgs {
    /// Environment defaults with flags applied on top.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(edge) = self.max_proxy_edge.filter(|edge| *edge > 0) {
            config.max_proxy_edge = edge;
        }
        if let Some(max) = self.max_history.filter(|max| *max > 0) {
            config.max_history = max;
        }
        config.force_fallback |= self.fallback;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let args = ConfigArgs {
            max_proxy_edge: Some(512),
            max_history: Some(10),
            fallback: true,
        };
        let config = args.engine_config();
        assert_eq!(config.max_proxy_edge, 512);
        assert_eq!(config.max_history, 10);
        assert!(config.force_fallback);
    }

    #[test]
    fn test_zero_flags_are_ignored() {
        let args = ConfigArgs {
            max_proxy_edge: Some(0),
            max_history: Some(0),
            fallback: false,
        };
        let config = args.engine_config();
        assert!(config.max_proxy_edge > 0);
        assert!(config.max_history > 0);
    }
}
