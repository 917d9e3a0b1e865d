// Analyzer module: position history plus the per-cycle ranking analysis.

pub mod history;
pub mod ranking;

// Re-export the main analyzer for ease of use.
pub use ranking::RankingAnalyzer;
