//! HTTP clients for the external APIs DraftForge orchestrates.
//!
//! This crate provides:
//! - [`SearchClient`] — search-data API (related questions, competitor listings)
//! - [`GenerativeClient`] — generative-text API (template-steered generation,
//!   usecase template discovery)
//!
//! Both clients map transport and status failures into the shared error type
//! with URL context; response-shape quirks (absent result fields, empty
//! generation batches) are left to the callers that consume them.

pub mod generate;
pub mod search;

pub use generate::{Generation, GenerativeClient, PromptVars};
pub use search::{OrganicResult, RelatedQuestion, SearchClient, SearchResponse};
