//! Single-statement partial updates.
//!
//! Every sparse update (users, notes, tags) is turned into one parameterized
//! `UPDATE` that touches only the columns the client supplied. Columns are
//! kept in the order they were declared so the generated SQL is stable.

use sqlx::PgExecutor;

#[derive(Debug, Clone)]
pub struct PartialUpdate {
    table: &'static str,
    assignments: Vec<(&'static str, String)>,
}

impl PartialUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    /// Queues `column = value` when a value is present; absent values are skipped.
    pub fn set<V: Into<String>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.assignments.push((column, value.into()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns `None` when no column was set, so an empty `SET` clause can
    /// never reach the database.
    pub fn build(self, id: i64) -> Option<UpdateStatement> {
        if self.is_empty() {
            return None;
        }

        let mut set_clause = Vec::with_capacity(self.assignments.len());
        let mut values = Vec::with_capacity(self.assignments.len());
        for (n, (column, value)) in self.assignments.into_iter().enumerate() {
            set_clause.push(format!("{} = ${}", column, n + 1));
            values.push(value);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${}",
            self.table,
            set_clause.join(", "),
            values.len() + 1
        );

        Some(UpdateStatement { sql, values, id })
    }
}

/// A ready-to-run update. Parameters bind as `values` in order, then `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    sql: String,
    values: Vec<String>,
    id: i64,
}

impl UpdateStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn param_count(&self) -> usize {
        self.values.len() + 1
    }

    /// Runs the statement and returns the number of affected rows.
    pub async fn execute<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<u64, sqlx::Error> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.values {
            query = query.bind(value);
        }
        let result = query.bind(self.id).execute(executor).await?;
        Ok(result.rows_affected())
    }
}
