//! Generative-text API client.
//!
//! Generation is steered by named "usecase" templates that live on the
//! service; a call supplies a template id plus the variables the template
//! interpolates. The service also exposes the template set itself, which is
//! where the pipeline's [`PromptTemplates`] come from.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use draftforge_shared::{DraftForgeError, PromptTemplates, Result, UsecaseId};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("DraftForge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

/// Variables interpolated into a usecase template.
///
/// The wire format is a flat string map; only the keys a given template
/// reads are sent. `subHeading` keeps its camelCase wire name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptVars {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(rename = "subHeading", skip_serializing_if = "Option::is_none")]
    pub sub_heading: Option<String>,
}

impl PromptVars {
    /// Variables for topic-driven templates (questions, headings, conclusion,
    /// introduction).
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    /// Variables for answer templates.
    pub fn for_question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            ..Self::default()
        }
    }

    /// Variables for the heading-paragraph template.
    pub fn for_heading(topic: impl Into<String>, heading: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            sub_heading: Some(heading.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    usecase_id: &'a str,
    variables: &'a PromptVars,
}

/// One generated text candidate. The first element of a batch is the one
/// the pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    pub text: String,
}

/// One entry of the service's ordered usecase listing.
#[derive(Debug, Clone, Deserialize)]
struct UsecaseEntry {
    id: String,
}

// ---------------------------------------------------------------------------
// GenerativeClient
// ---------------------------------------------------------------------------

/// Client for the generative-text API.
///
/// No `Debug` derive: the struct holds the API key.
#[derive(Clone)]
pub struct GenerativeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GenerativeClient {
    /// Create a new client against `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DraftForgeError::Generation(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Generate text with the given template and variables.
    ///
    /// Returns the raw candidate batch; the service contract promises at
    /// least one element, which callers verify when they consume it.
    pub async fn generate(
        &self,
        vars: &PromptVars,
        usecase: &UsecaseId,
    ) -> Result<Vec<Generation>> {
        let url = format!("{}/generate", self.base_url);
        debug!(%url, usecase = %usecase, "generate request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&GenerateRequest {
                usecase_id: usecase.as_str(),
                variables: vars,
            })
            .send()
            .await
            .map_err(|e| DraftForgeError::Generation(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DraftForgeError::Generation(format!("{url}: HTTP {status}")));
        }

        response
            .json::<Vec<Generation>>()
            .await
            .map_err(|e| DraftForgeError::Generation(format!("{url}: invalid response body: {e}")))
    }

    /// Fetch the service's ordered usecase template set.
    ///
    /// The wire order is a fixed contract; it is converted into named fields
    /// here so a short or misaligned set fails loudly at load time.
    pub async fn get_usecases(&self) -> Result<PromptTemplates> {
        let url = format!("{}/usecases", self.base_url);
        debug!(%url, "usecase listing request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DraftForgeError::Generation(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DraftForgeError::Generation(format!("{url}: HTTP {status}")));
        }

        let entries = response
            .json::<Vec<UsecaseEntry>>()
            .await
            .map_err(|e| DraftForgeError::Generation(format!("{url}: invalid response body: {e}")))?;

        PromptTemplates::from_ordered(entries.into_iter().map(|e| UsecaseId(e.id)).collect())
    }
}
