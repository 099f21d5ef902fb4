use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::ConfigError;

/// Configuration for a batch of episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Pause between ticks, for watching the snake in real time
    pub tick_delay: Duration,

    /// End an episode after this many ticks even without a collision
    pub max_ticks_per_episode: Option<u32>,

    /// Log a statistics summary every N episodes
    pub log_frequency: usize,

    /// Seed for apple placement; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            tick_delay: Duration::ZERO,
            max_ticks_per_episode: None,
            log_frequency: 10,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Create a configuration for `episodes` episodes with no pacing delay
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::ZeroEpisodes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.episodes, 100);
        assert_eq!(config.tick_delay, Duration::ZERO);
        assert_eq!(config.max_ticks_per_episode, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_episodes_rejected() {
        assert_eq!(RunConfig::new(0).validate(), Err(ConfigError::ZeroEpisodes));
    }
}
