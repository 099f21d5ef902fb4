//! Episode statistics for planner runs
//!
//! Tracks scores and episode lengths with a rolling window, plus run-wide
//! totals and the best score seen.

use std::collections::VecDeque;

/// Episode statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use dp_snake::metrics::EpisodeStats;
///
/// let mut stats = EpisodeStats::new(100);
/// stats.record_episode(5, 150);
///
/// assert_eq!(stats.high_score(), 5);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct EpisodeStats {
    /// Episode scores (apples eaten), rolling window
    episode_scores: VecDeque<u32>,

    /// Episode lengths in ticks, rolling window
    episode_lengths: VecDeque<u32>,

    total_episodes: usize,
    total_ticks: u64,
    high_score: u32,
    window_size: usize,
}

impl EpisodeStats {
    /// Create a tracker that averages over the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_scores: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_ticks: 0,
            high_score: 0,
            window_size: window_size.max(1),
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, score: u32, ticks: u32) {
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        Self::push_deque(&mut self.episode_lengths, ticks, self.window_size);
        self.total_episodes += 1;
        self.total_ticks += u64::from(ticks);
        self.high_score = self.high_score.max(score);
    }

    /// Mean score over the rolling window, 0.0 when empty
    pub fn mean_score(&self) -> f64 {
        Self::mean(&self.episode_scores)
    }

    /// Mean episode length over the rolling window, 0.0 when empty
    pub fn mean_length(&self) -> f64 {
        Self::mean(&self.episode_lengths)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary for logs and the status bar
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Ticks: {} | Score: {:.2} | Best: {} | Len: {:.1}",
            self.total_episodes,
            self.total_ticks,
            self.mean_score(),
            self.high_score,
            self.mean_length(),
        )
    }

    fn mean(deque: &VecDeque<u32>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().map(|v| f64::from(*v)).sum::<f64>() / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new(100)
    }
}
