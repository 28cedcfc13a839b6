//! Article lifecycle orchestration: research → elaboration → persistence.
//!
//! `create_article` owns every write to the article row. The row is created
//! in `processing` before any generation work starts, moves to `completed`
//! only after the content row is durably persisted, and is marked `failed`
//! (best-effort) when any stage errors. One invocation makes one attempt;
//! retry is the caller's concern.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use draftforge_clients::{GenerativeClient, SearchClient};
use draftforge_shared::{
    ArticleContent, ArticleId, ArticleInfo, ArticleStatus, DraftForgeError, Result, UserId,
};
use draftforge_storage::Storage;

use crate::elaborate;
use crate::research;

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
}

// ---------------------------------------------------------------------------
// Write path
// ---------------------------------------------------------------------------

/// Assemble and persist one article for `keyword`.
///
/// Returns the new article id on success. On any failure the caller sees
/// [`DraftForgeError::ArticleCreation`]; the underlying cause is logged, and
/// a row that was already created is marked `failed` best-effort.
#[instrument(skip_all, fields(user_id = %user_id, keyword = %keyword, run_id = %Uuid::now_v7()))]
pub async fn create_article(
    search: &SearchClient,
    generator: &GenerativeClient,
    storage: &Storage,
    user_id: UserId,
    keyword: &str,
    location: &str,
    progress: &dyn ProgressReporter,
) -> Result<ArticleId> {
    match run_stages(search, generator, storage, user_id, keyword, location, progress).await {
        Ok(article_id) => {
            info!(%article_id, "article completed");
            Ok(article_id)
        }
        Err((article_id, cause)) => {
            error!(error = %cause, article_id = ?article_id, "article assembly failed");

            // Compensating status update. Its outcome is logged on its own;
            // it never masks or merges with the primary failure.
            if let Some(article_id) = article_id {
                match storage
                    .update_article_status(user_id, article_id, ArticleStatus::Failed)
                    .await
                {
                    Ok(()) => info!(%article_id, "article marked failed"),
                    Err(comp) => {
                        warn!(%article_id, error = %comp, "could not mark article failed")
                    }
                }
            }

            Err(DraftForgeError::ArticleCreation)
        }
    }
}

/// The fallible stage sequence. Errors carry the article id (when one was
/// created) so the caller can compensate.
async fn run_stages(
    search: &SearchClient,
    generator: &GenerativeClient,
    storage: &Storage,
    user_id: UserId,
    keyword: &str,
    location: &str,
    progress: &dyn ProgressReporter,
) -> std::result::Result<ArticleId, (Option<ArticleId>, DraftForgeError)> {
    progress.phase("Creating article record");
    let article_id = storage
        .insert_article(user_id, keyword, location, ArticleStatus::Processing)
        .await
        .map_err(|e| (None, e))?;
    info!(%article_id, "article row created");

    let staged = async {
        progress.phase("Loading prompt templates");
        let templates = generator.get_usecases().await?;

        progress.phase("Gathering research");
        let bundle = research::gather(search, generator, keyword, location, &templates).await?;

        progress.phase("Composing sections");
        let sections = elaborate::compose(generator, keyword, &bundle, &templates).await?;

        progress.phase("Persisting content");
        storage
            .insert_article_content(&ArticleContent {
                article_id,
                user_id,
                related_questions_answers: sections.related_questions_answers,
                ai_questions_answers: sections.ai_questions_answers,
                quora_questions_answers: sections.quora_questions_answers,
                headings_paragraphs: sections.headings_paragraphs,
                conclusion_paragraph: sections.conclusion_paragraph,
                introduction_paragraph: sections.introduction_paragraph,
            })
            .await?;

        storage
            .update_article_status(user_id, article_id, ArticleStatus::Completed)
            .await?;

        Ok::<_, DraftForgeError>(())
    };

    staged.await.map_err(|e| (Some(article_id), e))?;
    Ok(article_id)
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

/// Fetch one article scoped to its owning user.
///
/// A missing row is a not-found condition; any other storage failure is
/// reported as a generic fetch error with the detail logged.
pub async fn get_article(
    storage: &Storage,
    user_id: UserId,
    article_id: ArticleId,
) -> Result<ArticleInfo> {
    match storage.get_article(user_id, article_id).await {
        Ok(Some(info)) => Ok(info),
        Ok(None) => Err(DraftForgeError::ArticleNotFound),
        Err(e) => {
            error!(error = %e, %article_id, "article read failed");
            Err(DraftForgeError::ArticleFetch)
        }
    }
}

/// Fetch all of a user's articles, newest first.
///
/// The store reports "no articles at all" as an absent collection, and that
/// surfaces here as not-found rather than an empty list.
pub async fn get_all_articles(storage: &Storage, user_id: UserId) -> Result<Vec<ArticleInfo>> {
    match storage.list_articles_by_user(user_id).await {
        Ok(Some(articles)) => Ok(articles),
        Ok(None) => Err(DraftForgeError::ArticleNotFound),
        Err(e) => {
            error!(error = %e, %user_id, "article listing failed");
            Err(DraftForgeError::ArticleFetch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USECASES: &[(&str, &str)] = &[
        ("uc-ai-questions", "Blog Questions"),
        ("uc-ai-headings", "Blog Outline"),
        ("uc-answer", "Question Answer"),
        ("uc-quora-answer", "Listing Answer"),
        ("uc-paragraph", "Section Paragraph"),
        ("uc-conclusion", "Conclusion"),
        ("uc-intro", "Introduction"),
    ];

    async fn temp_storage() -> (Storage, std::path::PathBuf) {
        let tmp_dir = std::env::temp_dir().join(format!("df-pipeline-test-{}", Uuid::now_v7()));
        let storage = Storage::open(&tmp_dir.join("test.db")).await.unwrap();
        (storage, tmp_dir)
    }

    async fn mount_usecases(server: &MockServer) {
        let listing: Vec<_> = USECASES
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/usecases"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing))
            .mount(server)
            .await;
    }

    async fn mount_search(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "dogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "related_questions": [
                    {"question": "What do dogs eat?"},
                    {"question": "How long do dogs live?"}
                ]
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "dogs site:quora.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic_results": [{"title": "Why do dogs bark? - Quora"}]
            })))
            .mount(server)
            .await;
    }

    async fn mount_generate(server: &MockServer, usecase: &str, text: &str) {
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(json!({"usecase_id": usecase})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"text": text}])))
            .mount(server)
            .await;
    }

    async fn mount_happy_generation(server: &MockServer) {
        mount_generate(server, "uc-ai-questions", "AI Q1?\nAI Q2?").await;
        mount_generate(server, "uc-ai-headings", "Heading one\nHeading two").await;
        mount_generate(server, "uc-answer", "An answer.").await;
        mount_generate(server, "uc-quora-answer", "A listing answer.").await;
        mount_generate(server, "uc-paragraph", "A paragraph.").await;
        mount_generate(server, "uc-conclusion", "In conclusion.").await;
        mount_generate(server, "uc-intro", "Introduction Paragraph: Welcome to dogs.").await;
    }

    fn clients_for(server: &MockServer) -> (SearchClient, GenerativeClient) {
        (
            SearchClient::new(server.uri(), "k").unwrap(),
            GenerativeClient::new(server.uri(), "k").unwrap(),
        )
    }

    #[tokio::test]
    async fn create_article_end_to_end() {
        let server = MockServer::start().await;
        mount_usecases(&server).await;
        mount_search(&server).await;
        mount_happy_generation(&server).await;

        let (search, generator) = clients_for(&server);
        let (storage, tmp) = temp_storage().await;

        let article_id = create_article(
            &search,
            &generator,
            &storage,
            UserId(1),
            "dogs",
            "United States",
            &SilentProgress,
        )
        .await
        .unwrap();

        let info = get_article(&storage, UserId(1), article_id).await.unwrap();
        assert_eq!(info.status, ArticleStatus::Completed);
        assert_eq!(info.keyword, "dogs");

        let content = storage
            .get_article_content(UserId(1), article_id)
            .await
            .unwrap()
            .expect("content persisted");
        assert_eq!(content.related_questions_answers.len(), 2);
        assert_eq!(content.ai_questions_answers.len(), 2);
        assert_eq!(content.quora_questions_answers.len(), 1);
        assert_eq!(content.quora_questions_answers[0].question, "Why do dogs bark?");
        assert_eq!(content.headings_paragraphs.len(), 2);
        assert_eq!(content.conclusion_paragraph, "In conclusion.");
        assert_eq!(content.introduction_paragraph, "Welcome to dogs.");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn conclusion_failure_marks_article_failed() {
        let server = MockServer::start().await;
        mount_usecases(&server).await;
        mount_search(&server).await;

        mount_generate(&server, "uc-ai-questions", "AI Q1?").await;
        mount_generate(&server, "uc-ai-headings", "Heading one").await;
        mount_generate(&server, "uc-answer", "An answer.").await;
        mount_generate(&server, "uc-quora-answer", "A listing answer.").await;
        mount_generate(&server, "uc-paragraph", "A paragraph.").await;
        mount_generate(&server, "uc-intro", "Welcome.").await;
        // The conclusion call fails.
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(json!({"usecase_id": "uc-conclusion"})))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (search, generator) = clients_for(&server);
        let (storage, tmp) = temp_storage().await;

        let err = create_article(
            &search,
            &generator,
            &storage,
            UserId(1),
            "dogs",
            "United States",
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DraftForgeError::ArticleCreation));

        // The row exists and was compensated to failed; no content row was written.
        let articles = get_all_articles(&storage, UserId(1)).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].status, ArticleStatus::Failed);
        assert!(storage
            .get_article_content(UserId(1), articles[0].id)
            .await
            .unwrap()
            .is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn template_load_failure_marks_article_failed() {
        let server = MockServer::start().await;
        // Usecase listing comes back short — a validation failure before any
        // research runs.
        Mock::given(method("GET"))
            .and(path("/usecases"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": "uc-1"}, {"id": "uc-2"}])),
            )
            .mount(&server)
            .await;

        let (search, generator) = clients_for(&server);
        let (storage, tmp) = temp_storage().await;

        let err = create_article(
            &search,
            &generator,
            &storage,
            UserId(1),
            "dogs",
            "US",
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DraftForgeError::ArticleCreation));

        let articles = get_all_articles(&storage, UserId(1)).await.unwrap();
        assert_eq!(articles[0].status, ArticleStatus::Failed);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn get_article_distinguishes_not_found() {
        let (storage, tmp) = temp_storage().await;

        let err = get_article(&storage, UserId(1), ArticleId(999))
            .await
            .unwrap_err();
        assert!(matches!(err, DraftForgeError::ArticleNotFound));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn get_all_articles_not_found_for_empty_user() {
        let (storage, tmp) = temp_storage().await;

        let err = get_all_articles(&storage, UserId(7)).await.unwrap_err();
        assert!(matches!(err, DraftForgeError::ArticleNotFound));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
