//! Search-data API client.
//!
//! Wraps a ValueSERP-style endpoint: one GET per query, keyword and location
//! as query parameters, JSON result sets for related questions and organic
//! (competitor) listings. Quora mode restricts the query to quora.com so the
//! organic results read as listing questions.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use draftforge_shared::{DraftForgeError, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("DraftForge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Subset of the search API response the pipeline consumes.
///
/// Both result sets are optional; the API omits them freely depending on the
/// query. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub related_questions: Option<Vec<RelatedQuestion>>,
    #[serde(default)]
    pub organic_results: Option<Vec<OrganicResult>>,
}

/// One "people also ask" entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedQuestion {
    #[serde(default)]
    pub question: Option<String>,
}

/// One organic result entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// SearchClient
// ---------------------------------------------------------------------------

/// Client for the search-data API.
///
/// No `Debug` derive: the struct holds the API key.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SearchClient {
    /// Create a new client against `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DraftForgeError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Run one search query.
    ///
    /// `quora_only` restricts the query to quora.com listings, which is how
    /// competitor-question research is sourced.
    pub async fn search(
        &self,
        keyword: &str,
        location: &str,
        quora_only: bool,
    ) -> Result<SearchResponse> {
        let query = if quora_only {
            format!("{keyword} site:quora.com")
        } else {
            keyword.to_string()
        };

        let url = format!("{}/search", self.base_url);
        debug!(%url, %query, %location, quora_only, "search request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("location", location),
            ])
            .send()
            .await
            .map_err(|e| DraftForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DraftForgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| DraftForgeError::Network(format!("{url}: invalid response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SearchClient {
        SearchClient::new(server.uri(), "test-key").unwrap()
    }

    #[tokio::test]
    async fn parses_related_questions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "dogs"))
            .and(query_param("location", "United States"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "related_questions": [
                    {"question": "What do dogs eat?"},
                    {"question": "How long do dogs live?"}
                ],
                "search_metadata": {"engine": "google"}
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .await
            .search("dogs", "United States", false)
            .await
            .unwrap();

        let questions = response.related_questions.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question.as_deref(), Some("What do dogs eat?"));
        assert!(response.organic_results.is_none());
    }

    #[tokio::test]
    async fn quora_mode_restricts_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "dogs site:quora.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [{"title": "Why do dogs bark? - Quora"}]
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .await
            .search("dogs", "United States", true)
            .await
            .unwrap();

        let results = response.organic_results.unwrap();
        assert_eq!(results[0].title.as_deref(), Some("Why do dogs bark? - Quora"));
    }

    #[tokio::test]
    async fn http_error_maps_to_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .search("dogs", "US", false)
            .await
            .unwrap_err();

        assert!(matches!(err, DraftForgeError::Network(_)));
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn absent_fields_deserialize_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .await
            .search("dogs", "US", false)
            .await
            .unwrap();

        assert!(response.related_questions.is_none());
        assert!(response.organic_results.is_none());
    }
}
