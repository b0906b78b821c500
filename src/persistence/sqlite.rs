use super::{PersistenceResult, PlanStore};
use crate::metadata::ProjectMetadata;
use crate::project::ProjectPlan;
use crate::task::{Task, WorkPackage};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

/// SQLite-backed project store. The connection is owned by the store value
/// for its whole lifetime and closed when the store is dropped.
pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS project_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS work_packages (
                id TEXT PRIMARY KEY,
                wp_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                task_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_metadata(
        &self,
        tx: &rusqlite::Transaction,
        metadata: &ProjectMetadata,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(metadata)?;
        tx.execute("DELETE FROM project_metadata", [])?;
        tx.execute(
            "INSERT INTO project_metadata (id, metadata_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_work_packages(
        &self,
        tx: &rusqlite::Transaction,
        work_packages: &[WorkPackage],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM work_packages", [])?;
        let mut stmt = tx.prepare("INSERT INTO work_packages (id, wp_json) VALUES (?1, ?2)")?;
        for wp in work_packages {
            let json = serde_json::to_string(wp)?;
            stmt.execute(params![wp.id, json])?;
        }
        Ok(())
    }

    fn save_tasks(&self, tx: &rusqlite::Transaction, plan: &ProjectPlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM tasks", [])?;
        let mut stmt = tx.prepare("INSERT INTO tasks (id, task_json) VALUES (?1, ?2)")?;
        for task in plan.tasks()? {
            let json = serde_json::to_string(&task)?;
            stmt.execute(params![task.id, json])?;
        }
        Ok(())
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_project(&self, plan: &ProjectPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_metadata(&tx, plan.metadata())?;
        self.save_work_packages(&tx, plan.work_packages())?;
        self.save_tasks(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn load_project(&self) -> PersistenceResult<Option<ProjectPlan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT metadata_json FROM project_metadata WHERE id = 1")?;
        let metadata_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(metadata_json) = metadata_json_opt else {
            return Ok(None);
        };

        let metadata: ProjectMetadata = serde_json::from_str(&metadata_json)?;

        let mut stmt = conn.prepare("SELECT wp_json FROM work_packages ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut work_packages = Vec::new();
        for json in rows {
            let wp: WorkPackage = serde_json::from_str(&json?)?;
            work_packages.push(wp);
        }

        let mut stmt = conn.prepare("SELECT task_json FROM tasks ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut tasks = Vec::new();
        for json in rows {
            let task: Task = serde_json::from_str(&json?)?;
            tasks.push(task);
        }

        super::validate_tasks(&tasks)?;

        let mut plan = ProjectPlan::from_parts(metadata, work_packages);
        for task in tasks {
            plan.upsert_task_record(task)?;
        }

        Ok(Some(plan))
    }
}
