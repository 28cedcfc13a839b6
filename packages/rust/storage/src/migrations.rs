//! SQL migration definitions for the DraftForge database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: articles, article_content",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Article lifecycle rows
CREATE TABLE IF NOT EXISTS articles (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    keyword    TEXT NOT NULL,
    location   TEXT NOT NULL,
    status     TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_user ON articles(user_id);

-- Generated content, one row per article, written once
CREATE TABLE IF NOT EXISTS article_content (
    article_id             INTEGER PRIMARY KEY REFERENCES articles(id) ON DELETE CASCADE,
    user_id                INTEGER NOT NULL,
    related_questions_json TEXT NOT NULL,
    ai_questions_json      TEXT NOT NULL,
    quora_questions_json   TEXT NOT NULL,
    headings_json          TEXT NOT NULL,
    conclusion_paragraph   TEXT NOT NULL,
    introduction_paragraph TEXT NOT NULL,
    created_at             TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_article_content_user ON article_content(user_id);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
