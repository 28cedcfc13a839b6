//! Core article-assembly pipeline for DraftForge.
//!
//! This crate ties the external clients and the article store together into
//! the end-to-end workflow:
//! - [`research`] — concurrent gathering of questions and headings
//! - [`elaborate`] — concurrent generation of answers, paragraphs, and framing
//! - [`pipeline`] — lifecycle orchestration with status tracking and
//!   best-effort failure compensation
//! - [`cleanup`] — text transforms applied to fetched titles and generated
//!   sections

pub mod cleanup;
pub mod elaborate;
pub mod pipeline;
pub mod research;

pub use elaborate::ElaborationBundle;
pub use pipeline::{ProgressReporter, SilentProgress, create_article, get_all_articles, get_article};
pub use research::ResearchBundle;
