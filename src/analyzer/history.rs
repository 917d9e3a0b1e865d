use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One observed rank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub position: u32,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ProductTrack {
    pub product_id: u64,
    pub observations: Vec<Observation>,
}

/// Per-product log of observed rank positions for the current tracking
/// period.
///
/// Tracks iterate in first-seen order and observations in append order.
/// Both orders are load-bearing: the daily summary's tie-break relies on
/// the former, its first-vs-last comparison on the latter.
#[derive(Debug, Default)]
pub struct PositionHistory {
    tracks: Vec<ProductTrack>,
    index: HashMap<u64, usize>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded position for a product, if any.
    pub fn last_position(&self, product_id: u64) -> Option<u32> {
        self.index
            .get(&product_id)
            .and_then(|&i| self.tracks[i].observations.last())
            .map(|o| o.position)
    }

    /// Appends an observation. The log is append-only; within one tracking
    /// period timestamps arrive in non-decreasing order.
    pub fn record(&mut self, product_id: u64, position: u32, observed_at: DateTime<Utc>) {
        let idx = *self.index.entry(product_id).or_insert_with(|| {
            self.tracks.push(ProductTrack {
                product_id,
                observations: Vec::new(),
            });
            self.tracks.len() - 1
        });
        self.tracks[idx].observations.push(Observation {
            position,
            observed_at,
        });
    }

    /// Tracks in first-seen order.
    pub fn tracks(&self) -> &[ProductTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Wholesale reset at the daily boundary.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index.clear();
    }
}
