//! Session manager for REPL prediction history

use std::collections::VecDeque;
use std::time::Instant;

use crate::types::PredictionResult;

/// Maximum number of predictions kept in history
const MAX_HISTORY_SIZE: usize = 1000;

/// Session state of one interactive run
pub struct SessionManager {
    history: VecDeque<PredictionResult>,
    session_start: Instant,
    prediction_count: usize,
    saved_count: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            history: VecDeque::new(),
            session_start: Instant::now(),
            prediction_count: 0,
            saved_count: 0,
        }
    }

    /// Record a prediction; the oldest entry is evicted at capacity
    pub fn record(&mut self, result: PredictionResult) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(result);
        self.prediction_count += 1;
    }

    pub fn mark_saved(&mut self) {
        self.saved_count += 1;
    }

    /// Most recent predictions first
    pub fn get_history(&self, limit: usize) -> Vec<&PredictionResult> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn last(&self) -> Option<&PredictionResult> {
        self.history.back()
    }

    pub fn prediction_count(&self) -> usize {
        self.prediction_count
    }

    pub fn saved_count(&self) -> usize {
        self.saved_count
    }

    /// Session duration in seconds
    pub fn session_duration(&self) -> u64 {
        self.session_start.elapsed().as_secs()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.prediction_count = 0;
        self.saved_count = 0;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
