mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::{types::Type, Connection, OptionalExtension, Row};

use crate::models::patch;
use crate::models::*;

/// Process-wide handle to the SQLite store.
///
/// Cloning is cheap and shares the underlying connection; the mutex serializes
/// requests so that each one observes and commits a consistent state.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, nome, descricao, resultados_financeiros FROM projects ORDER BY id",
        )?;

        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.lock()?;
        fetch_project(&conn, id)
    }

    pub fn get_project_with_features(&self, id: i64) -> Result<Option<ProjectWithFeatures>> {
        let conn = self.lock()?;
        let Some(project) = fetch_project(&conn, id)? else {
            return Ok(None);
        };
        let features = fetch_features_by_project(&conn, id)?;

        Ok(Some(ProjectWithFeatures { project, features }))
    }

    /// Create a project together with any embedded features and tasks.
    ///
    /// The whole tree is written in one transaction; a failure anywhere leaves
    /// no partial rows behind.
    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO projects (nome, descricao, resultados_financeiros) VALUES (?, ?, ?)",
            (&input.name, &input.description, &input.financial_results),
        )?;
        let project = Project {
            id: tx.last_insert_rowid(),
            name: input.name,
            description: input.description,
            financial_results: input.financial_results,
        };

        for feature in input.features {
            insert_feature(&tx, project.id, feature)?;
        }

        tx.commit()?;
        tracing::info!(project_id = project.id, "Created project");
        Ok(project)
    }

    pub fn update_project(&self, id: i64, input: UpdateProjectInput) -> Result<Option<Project>> {
        let conn = self.lock()?;
        let Some(existing) = fetch_project(&conn, id)? else {
            return Ok(None);
        };

        let name = patch::apply_required(input.name, existing.name);
        let description = patch::apply(input.description, existing.description);
        let financial_results = patch::apply(input.financial_results, existing.financial_results);

        conn.execute(
            "UPDATE projects SET nome = ?, descricao = ?, resultados_financeiros = ? WHERE id = ?",
            (&name, &description, &financial_results, id),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            financial_results,
        }))
    }

    /// Delete a project and everything below it, deepest rows first.
    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let tasks = tx.execute(
            "DELETE FROM tasks WHERE feature_id IN (SELECT id FROM features WHERE projeto_id = ?)",
            [id],
        )?;
        let features = tx.execute("DELETE FROM features WHERE projeto_id = ?", [id])?;
        if tx.execute("DELETE FROM projects WHERE id = ?", [id])? == 0 {
            return Ok(false);
        }

        tx.commit()?;
        tracing::info!(project_id = id, features, tasks, "Deleted project");
        Ok(true)
    }

    // ============================================================
    // Feature operations
    // ============================================================

    pub fn get_features_by_project(&self, project_id: i64) -> Result<Vec<Feature>> {
        let conn = self.lock()?;
        fetch_features_by_project(&conn, project_id)
    }

    pub fn get_feature(&self, id: i64) -> Result<Option<Feature>> {
        let conn = self.lock()?;
        fetch_feature(&conn, id)
    }

    pub fn get_feature_with_tasks(&self, id: i64) -> Result<Option<FeatureWithTasks>> {
        let conn = self.lock()?;
        let Some(feature) = fetch_feature(&conn, id)? else {
            return Ok(None);
        };
        let tasks = fetch_tasks_by_feature(&conn, id)?;

        Ok(Some(FeatureWithTasks { feature, tasks }))
    }

    /// Create a feature (and its embedded tasks) under a project.
    ///
    /// Returns `None` without writing anything when the project does not exist.
    pub fn create_feature(
        &self,
        project_id: i64,
        input: CreateFeatureInput,
    ) -> Result<Option<Feature>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if fetch_project(&tx, project_id)?.is_none() {
            return Ok(None);
        }
        let feature = insert_feature(&tx, project_id, input)?;

        tx.commit()?;
        Ok(Some(feature))
    }

    pub fn update_feature(&self, id: i64, input: UpdateFeatureInput) -> Result<Option<Feature>> {
        let conn = self.lock()?;
        let Some(existing) = fetch_feature(&conn, id)? else {
            return Ok(None);
        };

        let name = patch::apply_required(input.name, existing.name);
        let description = patch::apply(input.description, existing.description);

        conn.execute(
            "UPDATE features SET nome = ?, descricao = ? WHERE id = ?",
            (&name, &description, id),
        )?;

        Ok(Some(Feature {
            id,
            project_id: existing.project_id,
            name,
            description,
        }))
    }

    /// Delete a feature and its tasks.
    pub fn delete_feature(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let tasks = tx.execute("DELETE FROM tasks WHERE feature_id = ?", [id])?;
        if tx.execute("DELETE FROM features WHERE id = ?", [id])? == 0 {
            return Ok(false);
        }

        tx.commit()?;
        tracing::info!(feature_id = id, tasks, "Deleted feature");
        Ok(true)
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn get_tasks_by_feature(&self, feature_id: i64) -> Result<Vec<Task>> {
        let conn = self.lock()?;
        fetch_tasks_by_feature(&conn, feature_id)
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.lock()?;
        fetch_task(&conn, id)
    }

    /// Create a task under a feature. Returns `None` when the feature does not exist.
    pub fn create_task(&self, feature_id: i64, input: CreateTaskInput) -> Result<Option<Task>> {
        let conn = self.lock()?;

        if fetch_feature(&conn, feature_id)?.is_none() {
            return Ok(None);
        }

        insert_task(&conn, feature_id, input).map(Some)
    }

    pub fn update_task(&self, id: i64, input: UpdateTaskInput) -> Result<Option<Task>> {
        let conn = self.lock()?;
        let Some(existing) = fetch_task(&conn, id)? else {
            return Ok(None);
        };

        let name = patch::apply_required(input.name, existing.name);
        let description = patch::apply(input.description, existing.description);
        let status = patch::apply_required(input.status, existing.status);
        // Never move the timestamp backwards, even if the wall clock does.
        let modified_at = now_utc().max(existing.modified_at);

        conn.execute(
            "UPDATE tasks SET nome = ?, descricao = ?, status = ?, data = ? WHERE id = ?",
            (
                &name,
                &description,
                &status,
                format_timestamp(&modified_at),
                id,
            ),
        )?;

        Ok(Some(Task {
            id,
            feature_id: existing.feature_id,
            name,
            description,
            status,
            modified_at,
        }))
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<platform data dir>/projectboard/projectboard.db`
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "projectboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("projectboard.db"))
}

// ============================================================
// Statement helpers shared by plain connections and transactions
// ============================================================

fn fetch_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT id, nome, descricao, resultados_financeiros FROM projects WHERE id = ?",
            [id],
            project_from_row,
        )
        .optional()?;
    Ok(project)
}

fn fetch_feature(conn: &Connection, id: i64) -> Result<Option<Feature>> {
    let feature = conn
        .query_row(
            "SELECT id, projeto_id, nome, descricao FROM features WHERE id = ?",
            [id],
            feature_from_row,
        )
        .optional()?;
    Ok(feature)
}

fn fetch_features_by_project(conn: &Connection, project_id: i64) -> Result<Vec<Feature>> {
    let mut stmt = conn.prepare(
        "SELECT id, projeto_id, nome, descricao FROM features WHERE projeto_id = ? ORDER BY id",
    )?;

    let features = stmt
        .query_map([project_id], feature_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(features)
}

fn fetch_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            "SELECT id, feature_id, nome, descricao, status, data FROM tasks WHERE id = ?",
            [id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

fn fetch_tasks_by_feature(conn: &Connection, feature_id: i64) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, feature_id, nome, descricao, status, data
         FROM tasks WHERE feature_id = ? ORDER BY id",
    )?;

    let tasks = stmt
        .query_map([feature_id], task_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tasks)
}

fn insert_feature(conn: &Connection, project_id: i64, input: CreateFeatureInput) -> Result<Feature> {
    conn.execute(
        "INSERT INTO features (projeto_id, nome, descricao) VALUES (?, ?, ?)",
        (project_id, &input.name, &input.description),
    )?;
    let feature = Feature {
        id: conn.last_insert_rowid(),
        project_id,
        name: input.name,
        description: input.description,
    };

    for task in input.tasks {
        insert_task(conn, feature.id, task)?;
    }

    tracing::debug!(feature_id = feature.id, project_id, "Created feature");
    Ok(feature)
}

fn insert_task(conn: &Connection, feature_id: i64, input: CreateTaskInput) -> Result<Task> {
    let status = input
        .status
        .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string());
    let modified_at = now_utc();

    conn.execute(
        "INSERT INTO tasks (feature_id, nome, descricao, status, data) VALUES (?, ?, ?, ?, ?)",
        (
            feature_id,
            &input.name,
            &input.description,
            &status,
            format_timestamp(&modified_at),
        ),
    )?;

    let task = Task {
        id: conn.last_insert_rowid(),
        feature_id,
        name: input.name,
        description: input.description,
        status,
        modified_at,
    };

    tracing::debug!(task_id = task.id, feature_id, "Created task");
    Ok(task)
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        financial_results: row.get(3)?,
    })
}

fn feature_from_row(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        feature_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        modified_at: parse_timestamp(5, row.get::<_, String>(5)?)?,
    })
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(idx: usize, s: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
