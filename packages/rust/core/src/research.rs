//! Research stage: concurrent gathering of questions and headings.
//!
//! Four independent fetches run in flight together (search-derived related
//! questions, quora listing titles, AI-seeded questions, AI-seeded headings)
//! and merge into a [`ResearchBundle`] once all four finish. A failure in any
//! fetch fails the stage; siblings are driven to completion before the first
//! error, in launch order, propagates.

use tracing::{debug, instrument};

use draftforge_clients::{Generation, GenerativeClient, PromptVars, SearchClient};
use draftforge_shared::{DraftForgeError, PromptTemplates, Result, UsecaseId};

use crate::cleanup::clean_listing_title;

/// Maximum related questions drawn from one search.
const MAX_RELATED_QUESTIONS: usize = 4;

/// Maximum listing titles drawn from one quora-mode search.
const MAX_QUORA_QUESTIONS: usize = 8;

/// Research material for one keyword, consumed by the elaboration stage.
#[derive(Debug, Clone, Default)]
pub struct ResearchBundle {
    pub keyword: String,
    /// Search-derived "people also ask" questions, at most 4.
    pub related_questions: Vec<String>,
    /// Cleaned quora listing titles, at most 8.
    pub quora_questions: Vec<String>,
    /// AI-seeded questions, one per generated line.
    pub ai_questions: Vec<String>,
    /// AI-seeded headings, one per generated line.
    pub ai_headings: Vec<String>,
}

/// Run the research stage for `keyword`.
#[instrument(skip_all, fields(keyword = %keyword, location = %location))]
pub async fn gather(
    search: &SearchClient,
    generator: &GenerativeClient,
    keyword: &str,
    location: &str,
    templates: &PromptTemplates,
) -> Result<ResearchBundle> {
    let (related, quora, ai_questions, ai_headings) = tokio::join!(
        fetch_related_questions(search, keyword, location),
        fetch_quora_questions(search, keyword, location),
        fetch_generated_lines(generator, keyword, &templates.ai_questions),
        fetch_generated_lines(generator, keyword, &templates.ai_headings),
    );

    let bundle = ResearchBundle {
        keyword: keyword.to_string(),
        related_questions: related?,
        quora_questions: quora?,
        ai_questions: ai_questions?,
        ai_headings: ai_headings?,
    };

    debug!(
        related = bundle.related_questions.len(),
        quora = bundle.quora_questions.len(),
        ai_questions = bundle.ai_questions.len(),
        ai_headings = bundle.ai_headings.len(),
        "research gathered"
    );

    Ok(bundle)
}

/// Fetch up to [`MAX_RELATED_QUESTIONS`] trimmed "people also ask" questions.
/// An absent result field yields an empty list.
async fn fetch_related_questions(
    search: &SearchClient,
    keyword: &str,
    location: &str,
) -> Result<Vec<String>> {
    let response = search.search(keyword, location, false).await?;

    let questions = response
        .related_questions
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.question)
        .filter(|q| !q.is_empty())
        .map(|q| q.trim().to_string())
        .take(MAX_RELATED_QUESTIONS)
        .collect();

    Ok(questions)
}

/// Fetch up to [`MAX_QUORA_QUESTIONS`] cleaned quora listing titles.
/// An absent result field yields an empty list.
async fn fetch_quora_questions(
    search: &SearchClient,
    keyword: &str,
    location: &str,
) -> Result<Vec<String>> {
    let response = search.search(keyword, location, true).await?;

    let titles = response
        .organic_results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| entry.title)
        .filter(|t| !t.is_empty())
        .map(|t| clean_listing_title(&t))
        .take(MAX_QUORA_QUESTIONS)
        .collect();

    Ok(titles)
}

/// Generate a line-per-entry list (questions or headings) for `keyword`.
async fn fetch_generated_lines(
    generator: &GenerativeClient,
    keyword: &str,
    usecase: &UsecaseId,
) -> Result<Vec<String>> {
    let batch = generator
        .generate(&PromptVars::for_topic(keyword), usecase)
        .await?;

    let text = first_generation_text(batch)?;
    Ok(text.trim().split('\n').map(str::to_string).collect())
}

/// Pull the first candidate out of a generation batch.
///
/// The service contract promises at least one element; an empty batch is a
/// generation fault, not a valid empty result.
pub(crate) fn first_generation_text(batch: Vec<Generation>) -> Result<String> {
    batch
        .into_iter()
        .next()
        .map(|generation| generation.text)
        .ok_or_else(|| DraftForgeError::Generation("empty generation batch".into()))
}
