use async_trait::async_trait;
use bryony_workflow::{Workflow, WorkflowTask};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};

use crate::{Error, Store};

/// A workflow as stored in the database. The task list is one JSON column;
/// tasks have no identity outside their owning workflow.
#[derive(Debug, FromRow)]
struct WorkflowRow {
  id: String,
  name: String,
  description: Option<String>,
  tasks: Json<Vec<WorkflowTask>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<WorkflowRow> for Workflow {
  fn from(row: WorkflowRow) -> Self {
    Self {
      id: row.id,
      name: row.name,
      description: row.description,
      tasks: row.tasks.0,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }
}

#[async_trait]
impl Store for SqliteStore {
  async fn save(&self, workflow: &Workflow) -> Result<(), Error> {
    sqlx::query(
      r#"
            INSERT INTO workflows (id, name, description, tasks, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                tasks = excluded.tasks,
                updated_at = excluded.updated_at
            "#,
    )
    .bind(&workflow.id)
    .bind(&workflow.name)
    .bind(&workflow.description)
    .bind(Json(&workflow.tasks))
    .bind(workflow.created_at)
    .bind(workflow.updated_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<Workflow>, Error> {
    let row: Option<WorkflowRow> = sqlx::query_as(
      r#"
            SELECT id, name, description, tasks, created_at, updated_at
            FROM workflows
            WHERE id = ?
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Workflow::from))
  }

  async fn list(&self) -> Result<Vec<Workflow>, Error> {
    let rows: Vec<WorkflowRow> = sqlx::query_as(
      r#"
            SELECT id, name, description, tasks, created_at, updated_at
            FROM workflows
            ORDER BY updated_at DESC
            "#,
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Workflow::from).collect())
  }

  async fn search(&self, query: &str) -> Result<Vec<Workflow>, Error> {
    let rows: Vec<WorkflowRow> = sqlx::query_as(
      r#"
            SELECT id, name, description, tasks, created_at, updated_at
            FROM workflows
            WHERE name LIKE '%' || ? || '%'
               OR COALESCE(description, '') LIKE '%' || ? || '%'
            ORDER BY updated_at DESC
            "#,
    )
    .bind(query)
    .bind(query)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Workflow::from).collect())
  }

  async fn delete(&self, id: &str) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
      .bind(id)
      .execute(&self.pool)
      .await?;

    Ok(result.rows_affected() > 0)
  }
}
