use crate::analyzer::history::PositionHistory;
use crate::clock::{Clock, SystemClock};
use crate::model::{
    AnalysisRecord, DailySummary, ImprovementWindow, Placement, PositionChange,
    PositionImprovement, ProductEntry, RawProduct,
};
use chrono::Local;

/// Tracks rank movement across polling cycles.
///
/// Owns the per-product position history for the current tracking period.
/// Every cycle must pass through `analyze` so the next cycle's lookups see
/// this one's positions.
pub struct RankingAnalyzer {
    history: PositionHistory,
    clock: Box<dyn Clock>,
}

impl RankingAnalyzer {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            history: PositionHistory::new(),
            clock,
        }
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    /// Computes rank deltas for one snapshot and folds it into the history.
    ///
    /// Input order defines rank: the element at index i holds rank i + 1.
    /// A product without a prior observation reports its current rank as the
    /// previous one and a zero change; an improvement event is emitted only
    /// when a prior position existed and the product moved up.
    pub fn analyze(&mut self, products: &[RawProduct]) -> AnalysisRecord {
        let now = self.clock.now();
        let mut advertised = Vec::new();
        let mut organic = Vec::new();
        let mut position_changes = Vec::new();

        for (idx, product) in products.iter().enumerate() {
            let position = (idx + 1) as u32;
            let previous = self.history.last_position(product.id);
            let name = product.name.clone().unwrap_or_default();

            let entry = ProductEntry {
                position,
                previous_position: previous.unwrap_or(position),
                position_change: previous.map_or(0, |p| i64::from(p) - i64::from(position)),
                id: product.id,
                name: name.clone(),
                brand: product.brand.clone().unwrap_or_default(),
                rating: product.rating.unwrap_or(0.0),
                feedbacks: product.feedbacks.unwrap_or(0),
                price: product.price(),
            };

            self.history.record(product.id, position, now);

            if let Some(prev) = previous {
                if prev > position {
                    position_changes.push(PositionChange {
                        id: product.id,
                        name,
                        old_position: prev,
                        new_position: position,
                        improvement: prev - position,
                    });
                }
            }

            match product.placement() {
                Placement::Advertised => advertised.push(entry),
                Placement::Organic => organic.push(entry),
            }
        }

        AnalysisRecord {
            timestamp: now,
            total_products: products.len(),
            advertised_count: advertised.len(),
            organic_count: organic.len(),
            advertised_products: advertised,
            organic_products: organic,
            position_changes,
        }
    }

    /// Net improvements over the current tracking period.
    ///
    /// Keeps products observed at least twice whose latest position beats
    /// the earliest, sorted by improvement descending; equal improvements
    /// keep first-seen order (stable sort). Read-only: the caller resets the
    /// history once the summary document is safely persisted.
    pub fn summarize(&self, query: &str, sort: &str) -> DailySummary {
        let mut improvements: Vec<PositionImprovement> = Vec::new();

        for track in self.history.tracks() {
            if track.observations.len() < 2 {
                continue;
            }
            let (Some(first), Some(last)) =
                (track.observations.first(), track.observations.last())
            else {
                continue;
            };
            if first.position <= last.position {
                continue;
            }
            improvements.push(PositionImprovement {
                product_id: track.product_id,
                start_position: first.position,
                end_position: last.position,
                improvement: first.position - last.position,
                timestamps: ImprovementWindow {
                    start: first.observed_at,
                    end: last.observed_at,
                },
            });
        }

        improvements.sort_by(|a, b| b.improvement.cmp(&a.improvement));

        DailySummary {
            date: self
                .clock
                .now()
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string(),
            query: query.to_string(),
            sort: sort.to_string(),
            total_movements: improvements.len(),
            position_improvements: improvements,
        }
    }

    /// Daily boundary reset; the next cycle starts with no prior positions.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }
}

impl Default for RankingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromoLog;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Advances five minutes on every read.
    struct StepClock {
        epoch: AtomicI64,
    }

    impl StepClock {
        fn starting_at(epoch: i64) -> Self {
            Self {
                epoch: AtomicI64::new(epoch),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let s = self.epoch.fetch_add(300, Ordering::SeqCst);
            Utc.timestamp_opt(s, 0).unwrap()
        }
    }

    fn analyzer() -> RankingAnalyzer {
        RankingAnalyzer::with_clock(Box::new(StepClock::starting_at(1_700_000_000)))
    }

    fn raw(id: u64, promoted: bool) -> RawProduct {
        RawProduct {
            id,
            name: Some(format!("product-{id}")),
            brand: Some("acme".to_string()),
            rating: Some(4.5),
            feedbacks: Some(17),
            sizes: None,
            log: promoted.then(|| PromoLog {
                promotion: serde_json::json!(1),
            }),
        }
    }

    fn ids(products: &[ProductEntry]) -> Vec<u64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn first_cycle_reports_zero_change() {
        let mut analyzer = analyzer();
        let record = analyzer.analyze(&[raw(1, true), raw(2, false), raw(3, false)]);

        assert_eq!(record.total_products, 3);
        assert_eq!(record.advertised_count, 1);
        assert_eq!(record.organic_count, 2);
        assert!(record.position_changes.is_empty());

        for entry in record.combined() {
            assert_eq!(entry.previous_position, entry.position);
            assert_eq!(entry.position_change, 0);
        }
    }

    #[test]
    fn rank_swap_emits_one_improvement_event() {
        let mut analyzer = analyzer();
        analyzer.analyze(&[raw(1, false), raw(2, false), raw(3, false)]);
        let record = analyzer.analyze(&[raw(2, false), raw(1, false), raw(3, false)]);

        let by_id = |id: u64| record.combined().find(|p| p.id == id).unwrap().clone();

        let a = by_id(1);
        assert_eq!(a.previous_position, 1);
        assert_eq!(a.position, 2);
        assert_eq!(a.position_change, -1);

        let b = by_id(2);
        assert_eq!(b.previous_position, 2);
        assert_eq!(b.position, 1);
        assert_eq!(b.position_change, 1);

        let c = by_id(3);
        assert_eq!(c.position_change, 0);

        assert_eq!(record.position_changes.len(), 1);
        let event = &record.position_changes[0];
        assert_eq!(event.id, 2);
        assert_eq!(event.old_position, 2);
        assert_eq!(event.new_position, 1);
        assert_eq!(event.improvement, 1);
    }

    #[test]
    fn placement_splits_advertised_from_organic() {
        let mut analyzer = analyzer();
        let record = analyzer.analyze(&[raw(1, true), raw(2, false), raw(3, true)]);

        assert_eq!(ids(&record.advertised_products), vec![1, 3]);
        assert_eq!(ids(&record.organic_products), vec![2]);
        // positions are ranks in the full list, not per category
        assert_eq!(record.advertised_products[1].position, 3);
    }

    #[test]
    fn history_is_append_only_and_time_ordered() {
        let mut analyzer = analyzer();
        analyzer.analyze(&[raw(1, false), raw(2, false)]);
        analyzer.analyze(&[raw(2, false), raw(1, false)]);

        let track = &analyzer.history().tracks()[0];
        assert_eq!(track.product_id, 1);
        let obs = &track.observations;
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].position, 1);
        assert_eq!(obs[1].position, 2);
        assert!(obs[0].observed_at < obs[1].observed_at);
    }

    #[test]
    fn summary_keeps_net_improvers_sorted_and_stable() {
        let mut analyzer = analyzer();
        // first-seen order: 10, 20, 30, 40, 1
        analyzer.analyze(&[
            raw(10, false),
            raw(20, false),
            raw(30, false),
            raw(40, false),
            raw(1, false),
        ]);
        // 40 goes 4 -> 1 and 1 goes 5 -> 2, both +3; 30 holds; 10 and 20 drop
        analyzer.analyze(&[
            raw(40, false),
            raw(1, false),
            raw(30, false),
            raw(10, false),
            raw(20, false),
        ]);

        let summary = analyzer.summarize("perfume", "popular");
        assert_eq!(summary.query, "perfume");
        assert_eq!(summary.sort, "popular");
        assert_eq!(summary.total_movements, 2);

        let first = &summary.position_improvements[0];
        let second = &summary.position_improvements[1];
        // equal improvement: first-seen order decides
        assert_eq!(first.product_id, 40);
        assert_eq!(second.product_id, 1);
        assert_eq!(first.improvement, 3);
        assert_eq!(second.improvement, 3);
        assert_eq!(second.start_position, 5);
        assert_eq!(second.end_position, 2);
        assert!(first.timestamps.start < first.timestamps.end);
    }

    #[test]
    fn summary_sorts_by_improvement_descending() {
        let mut analyzer = analyzer();
        analyzer.analyze(&[raw(1, false), raw(2, false), raw(3, false), raw(4, false)]);
        analyzer.analyze(&[raw(4, false), raw(3, false), raw(1, false), raw(2, false)]);

        let summary = analyzer.summarize("q", "popular");
        assert_eq!(summary.total_movements, 2);
        assert_eq!(summary.position_improvements[0].product_id, 4);
        assert_eq!(summary.position_improvements[0].improvement, 3);
        assert_eq!(summary.position_improvements[1].product_id, 3);
        assert_eq!(summary.position_improvements[1].improvement, 1);
    }

    #[test]
    fn single_observation_products_never_summarize() {
        let mut analyzer = analyzer();
        analyzer.analyze(&[raw(1, false)]);

        let summary = analyzer.summarize("q", "popular");
        assert_eq!(summary.total_movements, 0);
        assert!(summary.position_improvements.is_empty());
    }

    #[test]
    fn summarize_leaves_history_untouched_until_reset() {
        let mut analyzer = analyzer();
        analyzer.analyze(&[raw(1, false), raw(2, false)]);
        analyzer.analyze(&[raw(2, false), raw(1, false)]);

        let _ = analyzer.summarize("q", "popular");
        assert_eq!(analyzer.history().len(), 2);

        analyzer.reset_history();
        assert!(analyzer.history().is_empty());

        // the next cycle starts from scratch
        let record = analyzer.analyze(&[raw(2, false), raw(1, false)]);
        assert!(record.position_changes.is_empty());
        assert_eq!(record.organic_products[0].position_change, 0);
    }
}
