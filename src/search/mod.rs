// Upstream search API access.

mod client;
mod traits;

pub use client::WbSearchClient;
pub use traits::SearchProvider;
