use crate::model::{SearchError, SearchRequest};
use crate::search::SearchProvider;

use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "https://search.wb.ru/exactmatch/ru/common/v9/search";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) WbTrackerBot/0.1";

pub struct WbSearchClient {
    client: Client,
    base_url: String,
}

impl WbSearchClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder().user_agent(USER_AGENT).build().unwrap();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn query_params(req: &SearchRequest) -> [(&'static str, String); 11] {
        [
            ("ab_testing", "false".to_string()),
            ("appType", "1".to_string()),
            ("curr", "rub".to_string()),
            ("dest", "-1257786".to_string()),
            ("lang", "ru".to_string()),
            ("page", "1".to_string()),
            ("query", req.query.clone()),
            ("resultset", "catalog".to_string()),
            ("sort", req.sort.clone()),
            ("spp", "30".to_string()),
            ("suppressSpellcheck", "false".to_string()),
        ]
    }
}

impl Default for WbSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SearchProvider for WbSearchClient {
    async fn search(&self, req: &SearchRequest) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(req))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        Ok(response.json().await?)
    }
}
