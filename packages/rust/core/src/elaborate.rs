//! Elaboration stage: concurrent generation of answers, paragraphs, and framing.
//!
//! Six tasks run in flight together: answers for each of the three research
//! question lists, one paragraph per heading, a conclusion, and an
//! introduction. Per-question calls within a list are themselves concurrent;
//! results are merged back in launch order so output ordering is
//! deterministic. A failure in any task fails the stage.

use tracing::{debug, instrument};

use draftforge_clients::{GenerativeClient, PromptVars};
use draftforge_shared::{
    DraftForgeError, HeadingParagraph, PromptTemplates, QuestionAnswer, Result, UsecaseId,
};

use crate::cleanup::strip_intro_label;
use crate::research::{ResearchBundle, first_generation_text};

/// The six generated sections for one article, consumed by the persistence
/// step.
#[derive(Debug, Clone, Default)]
pub struct ElaborationBundle {
    pub related_questions_answers: Vec<QuestionAnswer>,
    pub ai_questions_answers: Vec<QuestionAnswer>,
    pub quora_questions_answers: Vec<QuestionAnswer>,
    pub headings_paragraphs: Vec<HeadingParagraph>,
    pub conclusion_paragraph: String,
    pub introduction_paragraph: String,
}

/// Run the elaboration stage over a research bundle.
#[instrument(skip_all, fields(keyword = %keyword))]
pub async fn compose(
    generator: &GenerativeClient,
    keyword: &str,
    bundle: &ResearchBundle,
    templates: &PromptTemplates,
) -> Result<ElaborationBundle> {
    // Related and AI questions share the answer template; quora questions
    // have their own.
    let (related, ai, quora, headings, conclusion, introduction) = tokio::join!(
        answer_questions(
            generator,
            &bundle.related_questions,
            &templates.question_answer,
        ),
        answer_questions(generator, &bundle.ai_questions, &templates.question_answer),
        answer_questions(generator, &bundle.quora_questions, &templates.quora_answer),
        write_heading_paragraphs(
            generator,
            keyword,
            &bundle.ai_headings,
            &templates.heading_paragraph,
        ),
        write_conclusion(generator, keyword, &templates.conclusion),
        write_introduction(generator, keyword, &templates.introduction),
    );

    let sections = ElaborationBundle {
        related_questions_answers: related?,
        ai_questions_answers: ai?,
        quora_questions_answers: quora?,
        headings_paragraphs: headings?,
        conclusion_paragraph: conclusion?,
        introduction_paragraph: introduction?,
    };

    debug!(
        related = sections.related_questions_answers.len(),
        ai = sections.ai_questions_answers.len(),
        quora = sections.quora_questions_answers.len(),
        headings = sections.headings_paragraphs.len(),
        "sections composed"
    );

    Ok(sections)
}

/// Answer every question in `questions` concurrently.
///
/// A question is dropped from the output when the service returns empty text
/// for it; surviving pairs keep the input order. All spawned calls are
/// drained before an error propagates.
async fn answer_questions(
    generator: &GenerativeClient,
    questions: &[String],
    usecase: &UsecaseId,
) -> Result<Vec<QuestionAnswer>> {
    let mut handles = Vec::with_capacity(questions.len());
    for question in questions {
        let generator = generator.clone();
        let usecase = usecase.clone();
        let question = question.clone();
        handles.push(tokio::spawn(async move {
            let batch = generator
                .generate(&PromptVars::for_question(question.as_str()), &usecase)
                .await?;
            Ok::<_, DraftForgeError>((question, first_generation_text(batch)?))
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.map_err(|e| {
            DraftForgeError::Generation(format!("answer task failed: {e}"))
        })?);
    }

    let mut pairs = Vec::with_capacity(results.len());
    for result in results {
        let (question, text) = result?;
        if text.is_empty() {
            continue;
        }
        pairs.push(QuestionAnswer {
            question,
            answer: text.trim().to_string(),
        });
    }
    Ok(pairs)
}

/// Write one paragraph per heading concurrently, with the same empty-text
/// filter and ordering rules as [`answer_questions`].
async fn write_heading_paragraphs(
    generator: &GenerativeClient,
    keyword: &str,
    headings: &[String],
    usecase: &UsecaseId,
) -> Result<Vec<HeadingParagraph>> {
    let mut handles = Vec::with_capacity(headings.len());
    for heading in headings {
        let generator = generator.clone();
        let usecase = usecase.clone();
        let keyword = keyword.to_string();
        let heading = heading.clone();
        handles.push(tokio::spawn(async move {
            let batch = generator
                .generate(&PromptVars::for_heading(keyword, heading.as_str()), &usecase)
                .await?;
            Ok::<_, DraftForgeError>((heading, first_generation_text(batch)?))
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.map_err(|e| {
            DraftForgeError::Generation(format!("paragraph task failed: {e}"))
        })?);
    }

    let mut pairs = Vec::with_capacity(results.len());
    for result in results {
        let (heading, text) = result?;
        if text.is_empty() {
            continue;
        }
        pairs.push(HeadingParagraph {
            heading,
            paragraph: text.trim().to_string(),
        });
    }
    Ok(pairs)
}

/// Write the closing paragraph.
async fn write_conclusion(
    generator: &GenerativeClient,
    keyword: &str,
    usecase: &UsecaseId,
) -> Result<String> {
    let batch = generator
        .generate(&PromptVars::for_topic(keyword), usecase)
        .await?;
    Ok(first_generation_text(batch)?.trim().to_string())
}

/// Write the opening paragraph, stripping the template's label prefix when
/// present.
async fn write_introduction(
    generator: &GenerativeClient,
    keyword: &str,
    usecase: &UsecaseId,
) -> Result<String> {
    let batch = generator
        .generate(&PromptVars::for_topic(keyword), usecase)
        .await?;
    let text = first_generation_text(batch)?;
    Ok(strip_intro_label(text.trim()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftforge_shared::UsecaseId;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn templates() -> PromptTemplates {
        PromptTemplates::from_ordered(
            [
                "uc-ai-questions",
                "uc-ai-headings",
                "uc-answer",
                "uc-quora-answer",
                "uc-paragraph",
                "uc-conclusion",
                "uc-intro",
            ]
            .into_iter()
            .map(|id| UsecaseId(id.into()))
            .collect(),
        )
        .unwrap()
    }

    fn bundle() -> ResearchBundle {
        ResearchBundle {
            keyword: "dogs".into(),
            related_questions: vec!["R1?".into(), "R2?".into(), "R3?".into()],
            quora_questions: vec!["Q1?".into()],
            ai_questions: vec!["A1?".into()],
            ai_headings: vec!["Heading one".into(), "Heading two".into()],
        }
    }

    async fn mount_generate_for(
        server: &MockServer,
        body_fragment: serde_json::Value,
        text: &str,
    ) {
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(body_fragment))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"text": text}])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn empty_answers_are_filtered_and_order_is_kept() {
        let server = MockServer::start().await;

        // R2 comes back empty and must be dropped; R1/R3 keep their order.
        mount_generate_for(&server, json!({"variables": {"question": "R1?"}}), " First. ").await;
        mount_generate_for(&server, json!({"variables": {"question": "R2?"}}), "").await;
        mount_generate_for(&server, json!({"variables": {"question": "R3?"}}), "Third.").await;
        mount_generate_for(&server, json!({"variables": {"question": "Q1?"}}), "Listing.").await;
        mount_generate_for(&server, json!({"variables": {"question": "A1?"}}), "Seeded.").await;
        mount_generate_for(
            &server,
            json!({"variables": {"subHeading": "Heading one"}}),
            "Para one.",
        )
        .await;
        mount_generate_for(
            &server,
            json!({"variables": {"subHeading": "Heading two"}}),
            "Para two.",
        )
        .await;
        mount_generate_for(&server, json!({"usecase_id": "uc-conclusion"}), "The end.").await;
        mount_generate_for(
            &server,
            json!({"usecase_id": "uc-intro"}),
            "Introduction Paragraph: Welcome.",
        )
        .await;

        let generator = GenerativeClient::new(server.uri(), "k").unwrap();
        let sections = compose(&generator, "dogs", &bundle(), &templates())
            .await
            .unwrap();

        let related = &sections.related_questions_answers;
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].question, "R1?");
        assert_eq!(related[0].answer, "First.");
        assert_eq!(related[1].question, "R3?");
        assert!(related.iter().all(|pair| !pair.answer.is_empty()));

        assert_eq!(sections.quora_questions_answers.len(), 1);
        assert_eq!(sections.ai_questions_answers.len(), 1);

        let headings = &sections.headings_paragraphs;
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].heading, "Heading one");
        assert_eq!(headings[1].paragraph, "Para two.");

        assert_eq!(sections.conclusion_paragraph, "The end.");
        assert_eq!(sections.introduction_paragraph, "Welcome.");
    }

    #[tokio::test]
    async fn empty_bundle_composes_with_empty_sections() {
        let server = MockServer::start().await;

        mount_generate_for(&server, json!({"usecase_id": "uc-conclusion"}), "The end.").await;
        mount_generate_for(&server, json!({"usecase_id": "uc-intro"}), "Welcome.").await;

        let generator = GenerativeClient::new(server.uri(), "k").unwrap();
        let empty = ResearchBundle {
            keyword: "dogs".into(),
            ..ResearchBundle::default()
        };

        let sections = compose(&generator, "dogs", &empty, &templates())
            .await
            .unwrap();

        assert!(sections.related_questions_answers.is_empty());
        assert!(sections.ai_questions_answers.is_empty());
        assert!(sections.quora_questions_answers.is_empty());
        assert!(sections.headings_paragraphs.is_empty());
        assert_eq!(sections.introduction_paragraph, "Welcome.");
    }

    #[tokio::test]
    async fn failing_task_fails_the_stage() {
        let server = MockServer::start().await;

        // Every generate call fails; the first error in launch order surfaces.
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let generator = GenerativeClient::new(server.uri(), "k").unwrap();
        let err = compose(&generator, "dogs", &bundle(), &templates())
            .await
            .unwrap_err();
        assert!(matches!(err, DraftForgeError::Generation(_)));
    }
}
