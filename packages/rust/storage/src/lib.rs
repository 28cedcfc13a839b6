//! libSQL article store (local mode).
//!
//! The [`Storage`] struct wraps a libSQL database holding article lifecycle
//! rows and their generated content sections. Content section lists are
//! stored as JSON text columns; timestamps are RFC 3339 strings.
//!
//! **Access rules:**
//! - Pipeline/CLI: read-write (sole writer) via [`Storage::open`]
//! - Reporting consumers: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, Row, params};

use draftforge_shared::{
    ArticleContent, ArticleId, ArticleInfo, ArticleStatus, DraftForgeError, Result, UserId,
};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DraftForgeError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    DraftForgeError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(DraftForgeError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Article operations
    // -----------------------------------------------------------------------

    /// Insert a new article row and return its store-assigned id.
    pub async fn insert_article(
        &self,
        user_id: UserId,
        keyword: &str,
        location: &str,
        status: ArticleStatus,
    ) -> Result<ArticleId> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO articles (user_id, keyword, location, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id.0, keyword, location, status.as_str(), now.as_str()],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;
        Ok(ArticleId(self.conn.last_insert_rowid()))
    }

    /// Update an article's lifecycle status.
    pub async fn update_article_status(
        &self,
        user_id: UserId,
        article_id: ArticleId,
        status: ArticleStatus,
    ) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "UPDATE articles SET status = ?1 WHERE id = ?2 AND user_id = ?3",
                params![status.as_str(), article_id.0, user_id.0],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get one article row scoped to its owning user.
    pub async fn get_article(
        &self,
        user_id: UserId,
        article_id: ArticleId,
    ) -> Result<Option<ArticleInfo>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, keyword, location, status, created_at
                 FROM articles WHERE id = ?1 AND user_id = ?2",
                params![article_id.0, user_id.0],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_article_info(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DraftForgeError::Storage(e.to_string())),
        }
    }

    /// List a user's articles, newest first.
    ///
    /// Returns `None` when the user has no articles at all; callers treat
    /// that as a not-found condition. Whether zero articles should instead
    /// be an empty list is an open question with the store owner.
    pub async fn list_articles_by_user(&self, user_id: UserId) -> Result<Option<Vec<ArticleInfo>>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_id, keyword, location, status, created_at
                 FROM articles WHERE user_id = ?1 ORDER BY id DESC",
                params![user_id.0],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_article_info(&row)?);
        }

        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results))
        }
    }

    // -----------------------------------------------------------------------
    // Content operations
    // -----------------------------------------------------------------------

    /// Persist the full generated content for an article in a single write.
    pub async fn insert_article_content(&self, content: &ArticleContent) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO article_content
                   (article_id, user_id, related_questions_json, ai_questions_json,
                    quora_questions_json, headings_json, conclusion_paragraph,
                    introduction_paragraph, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    content.article_id.0,
                    content.user_id.0,
                    to_json(&content.related_questions_answers)?,
                    to_json(&content.ai_questions_answers)?,
                    to_json(&content.quora_questions_answers)?,
                    to_json(&content.headings_paragraphs)?,
                    content.conclusion_paragraph.as_str(),
                    content.introduction_paragraph.as_str(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get an article's generated content, if it has been persisted.
    pub async fn get_article_content(
        &self,
        user_id: UserId,
        article_id: ArticleId,
    ) -> Result<Option<ArticleContent>> {
        let mut rows = self
            .conn
            .query(
                "SELECT article_id, user_id, related_questions_json, ai_questions_json,
                        quora_questions_json, headings_json, conclusion_paragraph,
                        introduction_paragraph
                 FROM article_content WHERE article_id = ?1 AND user_id = ?2",
                params![article_id.0, user_id.0],
            )
            .await
            .map_err(|e| DraftForgeError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_article_content(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DraftForgeError::Storage(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| DraftForgeError::Storage(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(value).map_err(|e| DraftForgeError::Storage(e.to_string()))
}

fn column_str(row: &Row, idx: i32) -> Result<String> {
    row.get::<String>(idx)
        .map_err(|e| DraftForgeError::Storage(e.to_string()))
}

fn column_i64(row: &Row, idx: i32) -> Result<i64> {
    row.get::<i64>(idx)
        .map_err(|e| DraftForgeError::Storage(e.to_string()))
}

fn row_to_article_info(row: &Row) -> Result<ArticleInfo> {
    let status = ArticleStatus::from_str(&column_str(row, 4)?)?;
    let created_at = DateTime::parse_from_rfc3339(&column_str(row, 5)?)
        .map_err(|e| DraftForgeError::Storage(format!("bad created_at: {e}")))?
        .with_timezone(&Utc);

    Ok(ArticleInfo {
        id: ArticleId(column_i64(row, 0)?),
        user_id: UserId(column_i64(row, 1)?),
        keyword: column_str(row, 2)?,
        location: column_str(row, 3)?,
        status,
        created_at,
    })
}

fn row_to_article_content(row: &Row) -> Result<ArticleContent> {
    Ok(ArticleContent {
        article_id: ArticleId(column_i64(row, 0)?),
        user_id: UserId(column_i64(row, 1)?),
        related_questions_answers: from_json(&column_str(row, 2)?)?,
        ai_questions_answers: from_json(&column_str(row, 3)?)?,
        quora_questions_answers: from_json(&column_str(row, 4)?)?,
        headings_paragraphs: from_json(&column_str(row, 5)?)?,
        conclusion_paragraph: column_str(row, 6)?,
        introduction_paragraph: column_str(row, 7)?,
    })
}
