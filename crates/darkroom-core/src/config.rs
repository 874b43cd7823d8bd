//! Engine configuration.

use crate::history::DEFAULT_MAX_HISTORY;

/// Default longest edge of the interactive proxy buffer.
const DEFAULT_MAX_PROXY_EDGE: u32 = 2048;

/// Runtime configuration shared by the session and renderer selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longest edge of the downscaled working copy used for editing.
    pub max_proxy_edge: u32,
    /// Capacity of each image's history timeline.
    pub max_history: usize,
    /// Skip the GPU backend and render with the reduced renderer.
    pub force_fallback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_proxy_edge: std::env::var("DARKROOM_MAX_PROXY_EDGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|edge: &u32| *edge > 0)
                .unwrap_or(DEFAULT_MAX_PROXY_EDGE),
            max_history: std::env::var("DARKROOM_MAX_HISTORY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|max: &usize| *max > 0)
                .unwrap_or(DEFAULT_MAX_HISTORY),
            force_fallback: std::env::var("DARKROOM_FORCE_FALLBACK").is_ok(),
        }
    }
}

impl EngineConfig {
    /// Configuration with built-in defaults, ignoring the environment.
    pub fn builtin() -> Self {
        Self {
            max_proxy_edge: DEFAULT_MAX_PROXY_EDGE,
            max_history: DEFAULT_MAX_HISTORY,
            force_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;

    #[test]
    fn test_builtin_history_matches_timeline_default() {
        assert_eq!(EngineConfig::builtin().max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(History::default().max_entries(), EngineConfig::builtin().max_history);
    }
}
