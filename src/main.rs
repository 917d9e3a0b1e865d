use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use wb_tracker::analyzer::RankingAnalyzer;
use wb_tracker::config::{AppConfig, load_config};
use wb_tracker::model::{SearchRequest, SearchResponse};
use wb_tracker::search::{SearchProvider, WbSearchClient};
use wb_tracker::storage::SnapshotStore;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Log details about any panic before the process dies
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from file
    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let summary_time = match NaiveTime::parse_from_str(&config.summary_time, "%H:%M") {
        Ok(t) => t,
        Err(e) => {
            error!("Invalid summary_time '{}': {}", config.summary_time, e);
            return;
        }
    };

    // Storage failures at startup are unrecoverable
    let store = match SnapshotStore::open(&config.data_dir) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    let client = WbSearchClient::new();
    let mut analyzer = RankingAnalyzer::new();
    let mut next_summary_at = next_occurrence(Local::now().naive_local(), summary_time);

    info!(
        "🚀 wb-tracker started: '{}' every {}s, summary at {}",
        config.query, config.check_interval_seconds, config.summary_time
    );

    // Main tracking loop: one cycle in flight, daily summary at the boundary
    loop {
        if Local::now().naive_local() >= next_summary_at {
            run_daily_summary(&mut analyzer, &store, &config);
            next_summary_at += chrono::Duration::days(1);
        }

        run_cycle(&client, &mut analyzer, &store, &config).await;

        info!("Waiting for timer ({}s)...", config.check_interval_seconds);
        sleep(Duration::from_secs(config.check_interval_seconds)).await;
    }
}

/// One tracking cycle: fetch, persist the raw dump, analyze, persist the
/// analysis. Any failure is logged and the cycle abandoned until the next
/// trigger fires.
async fn run_cycle(
    client: &WbSearchClient,
    analyzer: &mut RankingAnalyzer,
    store: &SnapshotStore,
    config: &AppConfig,
) {
    info!("Fetching rankings for: {}", config.query);
    let request = SearchRequest {
        query: config.query.clone(),
        sort: config.sort.clone(),
    };

    let raw = match client.search(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Search error: {}", e);
            return;
        }
    };

    let stamp = Local::now();
    if let Err(e) = store.save_ranks(&raw, &config.query, &config.sort, stamp) {
        warn!("Failed to save raw snapshot: {}", e);
    }

    let response: SearchResponse = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            warn!("Malformed search payload: {}", e);
            return;
        }
    };

    let record = analyzer.analyze(&response.into_products());
    info!(
        "Found {} advertised and {} organic products",
        record.advertised_count, record.organic_count
    );
    if !record.position_changes.is_empty() {
        info!(
            "Detected {} position improvements",
            record.position_changes.len()
        );
    }

    match store.save_analysis(&record, &config.query, &config.sort, stamp) {
        Ok(path) => info!("Analysis saved: {}", path.display()),
        Err(e) => warn!("Failed to save analysis: {}", e),
    }
}

/// Daily boundary: persist the summary, then reset the history. A failed
/// write keeps the history so the day's data is not silently lost.
fn run_daily_summary(analyzer: &mut RankingAnalyzer, store: &SnapshotStore, config: &AppConfig) {
    let summary = analyzer.summarize(&config.query, &config.sort);
    info!(
        "Daily summary: {} position improvements",
        summary.total_movements
    );

    match store.save_summary(&summary, &config.query, &config.sort, Local::now()) {
        Ok(path) => {
            analyzer.reset_history();
            info!("Summary saved: {}", path.display());
        }
        Err(e) => warn!("Failed to save daily summary, keeping history: {}", e),
    }
}

fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let candidate = now.date().and_time(at);
    if candidate <= now {
        candidate + chrono::Duration::days(1)
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_occurrence_is_later_today_when_still_ahead() {
        let now = date(2026, 8, 7).and_hms_opt(10, 0, 0).unwrap();
        let at = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(
            next_occurrence(now, at),
            date(2026, 8, 7).and_hms_opt(23, 59, 0).unwrap()
        );
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow_once_passed() {
        let now = date(2026, 8, 7).and_hms_opt(23, 59, 30).unwrap();
        let at = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(
            next_occurrence(now, at),
            date(2026, 8, 8).and_hms_opt(23, 59, 0).unwrap()
        );
    }
}
