//! Core domain types for DraftForge articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DraftForgeError, Result};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Store-assigned article row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub i64);

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owning user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ArticleStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of an article.
///
/// `Processing` is set before any generation work begins; `Completed` only
/// after all content sections are durably persisted; `Failed` on an
/// unrecoverable stage error. Both non-processing states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Processing,
    Completed,
    Failed,
}

impl ArticleStatus {
    /// Storage column value for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = DraftForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(DraftForgeError::validation(format!(
                "unknown article status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ArticleInfo
// ---------------------------------------------------------------------------

/// Article metadata row as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleInfo {
    /// Store-assigned identifier.
    pub id: ArticleId,
    /// Owning user.
    pub user_id: UserId,
    /// Keyword the article was generated for.
    pub keyword: String,
    /// Search location used for research queries.
    pub location: String,
    /// Current lifecycle status.
    pub status: ArticleStatus,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Content sections
// ---------------------------------------------------------------------------

/// One generated answer for a research question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// One generated paragraph for an article sub-heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingParagraph {
    pub heading: String,
    pub paragraph: String,
}

/// The full generated content for one article, written exactly once after
/// both pipeline stages complete. A later failed run never retracts content
/// that was already persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    pub article_id: ArticleId,
    pub user_id: UserId,
    /// Answers to search-derived related questions, in fetch order.
    pub related_questions_answers: Vec<QuestionAnswer>,
    /// Answers to AI-seeded questions, in generation order.
    pub ai_questions_answers: Vec<QuestionAnswer>,
    /// Answers to competitor-listing (quora) questions, in fetch order.
    pub quora_questions_answers: Vec<QuestionAnswer>,
    /// One paragraph per AI-seeded heading, in generation order.
    pub headings_paragraphs: Vec<HeadingParagraph>,
    pub conclusion_paragraph: String,
    pub introduction_paragraph: String,
}

// ---------------------------------------------------------------------------
// Prompt templates
// ---------------------------------------------------------------------------

/// Identifier of a named prompt template ("usecase") on the generative API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsecaseId(pub String);

impl UsecaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UsecaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The seven prompt templates the pipeline draws on, by role.
///
/// The generative service exposes these as an ordered list; the wire order is
/// a fixed contract (AI questions, AI headings, question answer, quora answer,
/// heading paragraph, conclusion, introduction). [`PromptTemplates::from_ordered`]
/// converts that list into named fields so no positional indexing survives
/// past the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub ai_questions: UsecaseId,
    pub ai_headings: UsecaseId,
    pub question_answer: UsecaseId,
    pub quora_answer: UsecaseId,
    pub heading_paragraph: UsecaseId,
    pub conclusion: UsecaseId,
    pub introduction: UsecaseId,
}

impl PromptTemplates {
    /// Number of templates the wire contract requires.
    pub const REQUIRED: usize = 7;

    /// Build from the service's ordered template list.
    ///
    /// Entries beyond the seventh are ignored; fewer than seven is a
    /// validation error surfaced at load time rather than as an
    /// out-of-bounds panic at the call site.
    pub fn from_ordered(mut ordered: Vec<UsecaseId>) -> Result<Self> {
        if ordered.len() < Self::REQUIRED {
            return Err(DraftForgeError::validation(format!(
                "usecase set has {} entries, expected at least {}",
                ordered.len(),
                Self::REQUIRED
            )));
        }
        ordered.truncate(Self::REQUIRED);
        let mut it = ordered.into_iter();
        Ok(Self {
            ai_questions: it.next().expect("length checked"),
            ai_headings: it.next().expect("length checked"),
            question_answer: it.next().expect("length checked"),
            quora_answer: it.next().expect("length checked"),
            heading_paragraph: it.next().expect("length checked"),
            conclusion: it.next().expect("length checked"),
            introduction: it.next().expect("length checked"),
        })
    }
}
