use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::db::models::{
    Identity, NewNote, NewTag, Note, NoteId, NoteUpdate, Tag, TagId, TagUpdate, UserId, UserUpdate,
};
use crate::db::store::{CredentialStore, NoteStore, TagStore, UserStore};
use crate::db::update::PartialUpdate;
use crate::error::DatabaseError;

pub const USERS_TABLE: &str = "users";
pub const NOTES_TABLE: &str = "notes";
pub const TAGS_TABLE: &str = "tags";

pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>, DatabaseError> {
        Ok(self.pool.as_ref().begin().await?)
    }

    /// Executes a partial update. A builder with nothing set is a no-op.
    pub async fn run_update(
        &self,
        update: PartialUpdate,
        id: i64,
    ) -> Result<(), sqlx::Error> {
        let Some(statement) = update.build(id) else {
            debug!("Skipping update of row {}: no fields supplied", id);
            return Ok(());
        };

        debug!("Running partial update: {}", statement.sql());
        let affected = statement.execute(self.pool.as_ref()).await?;
        if affected == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn change_note_tags(
        &self,
        note: NoteId,
        tags: &[TagId],
        sql: &str,
    ) -> Result<(), DatabaseError> {
        let mut transaction = self.begin_transaction().await?;

        for tag in tags {
            let result = sqlx::query(sql)
                .bind(note)
                .bind(tag)
                .execute(&mut *transaction)
                .await;

            if let Err(e) = result {
                transaction.rollback().await?;
                return Err(DatabaseError::classify(e, "tag", tag));
            }
        }

        transaction.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for DbOperations {
    async fn persist_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError> {
        sqlx::query_as::<_, Identity>(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id, username",
        )
        .bind(username)
        .bind(digest)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| DatabaseError::classify(e, "user", username))
    }

    async fn find_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError> {
        sqlx::query_as::<_, Identity>(
            "SELECT id, username FROM users WHERE username = $1 AND password = $2",
        )
        .bind(username)
        .bind(digest)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| DatabaseError::classify(e, "user", username))
    }
}

#[async_trait]
impl UserStore for DbOperations {
    async fn get_user(&self, id: UserId) -> Result<Identity, DatabaseError> {
        sqlx::query_as::<_, Identity>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "user", id))
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DatabaseError> {
        Ok(sqlx::query_as::<_, Identity>("SELECT id, username FROM users ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?)
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), DatabaseError> {
        let builder = PartialUpdate::new(USERS_TABLE)
            .set("username", update.username.as_deref())
            .set("password", update.password.as_deref());

        self.run_update(builder, id)
            .await
            .map_err(|e| classify_update(e, "user", id, update.username.as_deref()))
    }

    async fn delete_user(&self, id: UserId) -> Result<UserId, DatabaseError> {
        sqlx::query_scalar::<_, UserId>("DELETE FROM users WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "user", id))
    }
}

#[async_trait]
impl NoteStore for DbOperations {
    async fn create_note(&self, owner: UserId, note: &NewNote) -> Result<Note, DatabaseError> {
        sqlx::query_as::<_, Note>(
            "INSERT INTO notes (title, body, user_id) VALUES ($1, $2, $3) RETURNING id, title, body",
        )
        .bind(&note.title)
        .bind(&note.body)
        .bind(owner)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| DatabaseError::classify(e, "note", &note.title))
    }

    async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note, DatabaseError> {
        sqlx::query_as::<_, Note>("SELECT id, title, body FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "note", id))
    }

    async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, Note>("SELECT id, title, body FROM notes WHERE user_id = $1 ORDER BY id")
                .bind(owner)
                .fetch_all(self.pool.as_ref())
                .await?,
        )
    }

    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<(), DatabaseError> {
        let builder = PartialUpdate::new(NOTES_TABLE)
            .set("title", update.title.as_deref())
            .set("body", update.body.as_deref());

        self.run_update(builder, id)
            .await
            .map_err(|e| classify_update(e, "note", id, None))
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<NoteId, DatabaseError> {
        sqlx::query_scalar::<_, NoteId>("DELETE FROM notes WHERE id = $1 AND user_id = $2 RETURNING id")
            .bind(id)
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "note", id))
    }

    async fn attach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError> {
        self.change_note_tags(
            note,
            tags,
            "INSERT INTO notes_tags (note_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .await
    }

    async fn detach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError> {
        self.change_note_tags(
            note,
            tags,
            "DELETE FROM notes_tags WHERE note_id = $1 AND tag_id = $2",
        )
        .await
    }

    async fn note_tags(&self, note: NoteId) -> Result<Vec<Tag>, DatabaseError> {
        Ok(sqlx::query_as::<_, Tag>(
            r#"
            SELECT tags.id, tags.name
            FROM tags
            JOIN notes_tags ON notes_tags.tag_id = tags.id
            WHERE notes_tags.note_id = $1
            ORDER BY tags.id
            "#,
        )
        .bind(note)
        .fetch_all(self.pool.as_ref())
        .await?)
    }
}

#[async_trait]
impl TagStore for DbOperations {
    async fn create_tag(&self, owner: UserId, tag: &NewTag) -> Result<Tag, DatabaseError> {
        sqlx::query_as::<_, Tag>("INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING id, name")
            .bind(&tag.name)
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "tag", &tag.name))
    }

    async fn get_tag(&self, owner: UserId, id: TagId) -> Result<Tag, DatabaseError> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "tag", id))
    }

    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, DatabaseError> {
        Ok(sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE user_id = $1 ORDER BY id")
            .bind(owner)
            .fetch_all(self.pool.as_ref())
            .await?)
    }

    async fn update_tag(&self, id: TagId, update: &TagUpdate) -> Result<(), DatabaseError> {
        let builder = PartialUpdate::new(TAGS_TABLE).set("name", update.name.as_deref());

        self.run_update(builder, id)
            .await
            .map_err(|e| classify_update(e, "tag", id, update.name.as_deref()))
    }

    async fn delete_tag(&self, owner: UserId, id: TagId) -> Result<TagId, DatabaseError> {
        sqlx::query_scalar::<_, TagId>("DELETE FROM tags WHERE id = $1 AND user_id = $2 RETURNING id")
            .bind(id)
            .bind(owner)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::classify(e, "tag", id))
    }
}

/// Missing rows are reported by id, unique violations by the offending value.
fn classify_update(
    err: sqlx::Error,
    entity: &'static str,
    id: i64,
    value: Option<&str>,
) -> DatabaseError {
    match (err, value) {
        (err @ sqlx::Error::Database(_), Some(value)) => DatabaseError::classify(err, entity, value),
        (err, _) => DatabaseError::classify(err, entity, id),
    }
}
