use super::{PersistenceError, PersistenceResult};
use crate::metadata::ProjectMetadata;
use crate::project::ProjectPlan;
use crate::task::{Dependency, DependencyType, Task, WorkPackage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// On-disk document shape. Field names match the JSON documents the
/// planning UI exports (`startDate`, `workPackages`, camelCase task
/// fields), so those files load unchanged.
#[derive(Serialize, Deserialize)]
struct ProjectSnapshot {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "startDate")]
    start_date: NaiveDate,
    #[serde(rename = "workPackages", default)]
    work_packages: Vec<WorkPackage>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl ProjectSnapshot {
    fn from_plan(plan: &ProjectPlan) -> PersistenceResult<Self> {
        let tasks = plan.tasks()?;
        super::validate_tasks(&tasks)?;
        let metadata = plan.metadata();
        Ok(Self {
            title: metadata.project_name.clone(),
            description: metadata.project_description.clone(),
            start_date: metadata.project_start_date,
            work_packages: plan.work_packages().to_vec(),
            tasks,
        })
    }

    fn into_plan(self) -> PersistenceResult<ProjectPlan> {
        super::validate_tasks(&self.tasks)?;
        let metadata = ProjectMetadata {
            project_name: self.title,
            project_description: self.description,
            project_start_date: self.start_date,
        };
        let mut plan = ProjectPlan::from_parts(metadata, self.work_packages);
        for task in self.tasks {
            plan.upsert_task_record(task)?;
        }
        Ok(plan)
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(plan: &ProjectPlan, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectPlan> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    duration_days: i64,
    dependencies: String,
    work_package_id: String,
    constraint_date: String,
    #[serde(default)]
    metadata_json: String,
    #[serde(default)]
    work_packages_json: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        let mut record = TaskCsvRecord::default();
        record.id = task.id.clone();
        record.name = task.name.clone();
        record.duration_days = task.duration_days;
        record.dependencies = join_dependencies(&task.dependencies);
        record.work_package_id = task.work_package_id.clone();
        record.constraint_date = format_date(task.constraint_date);
        record
    }
}

impl TaskCsvRecord {
    fn metadata_row(plan: &ProjectPlan) -> PersistenceResult<Self> {
        let mut record = TaskCsvRecord::default();
        record.name = "__metadata__".to_string();
        record.metadata_json = serde_json::to_string(plan.metadata())?;
        record.work_packages_json = serde_json::to_string(plan.work_packages())?;
        Ok(record)
    }

    fn is_metadata_row(&self) -> bool {
        !self.metadata_json.trim().is_empty()
    }

    fn into_task(self) -> PersistenceResult<Task> {
        if self.is_metadata_row() {
            return Err(PersistenceError::InvalidData(
                "metadata row cannot be converted to task".into(),
            ));
        }
        let mut task = Task::new(self.id, self.name, self.duration_days, self.work_package_id);
        task.dependencies = split_dependencies(&self.dependencies)?;
        task.constraint_date = parse_date(&self.constraint_date)?;
        Ok(task)
    }
}

fn join_dependencies(dependencies: &[Dependency]) -> String {
    dependencies
        .iter()
        .map(|dep| format!("{}:{}", dep.source_id, dep.kind))
        .collect::<Vec<_>>()
        .join(";")
}

fn split_dependencies(value: &str) -> PersistenceResult<Vec<Dependency>> {
    let mut dependencies = Vec::new();
    for part in value.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let Some((source_id, kind)) = part.rsplit_once(':') else {
            return Err(PersistenceError::InvalidData(format!(
                "invalid dependency entry '{part}' (expected sourceId:TYPE)"
            )));
        };
        let kind = DependencyType::from_str(kind)
            .map_err(PersistenceError::InvalidData)?;
        dependencies.push(Dependency::new(source_id, kind));
    }
    Ok(dependencies)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(value: &str) -> PersistenceResult<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|err| PersistenceError::InvalidData(format!("invalid date '{value}': {err}")))
}

pub fn save_project_to_csv<P: AsRef<Path>>(plan: &ProjectPlan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(TaskCsvRecord::metadata_row(plan)?)?;
    for task in plan.tasks()? {
        writer.serialize(TaskCsvRecord::from(&task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_project_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectPlan> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    let mut metadata: Option<ProjectMetadata> = None;
    let mut work_packages: Vec<WorkPackage> = Vec::new();

    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if metadata.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            metadata = Some(serde_json::from_str(&record.metadata_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid metadata json: {err}"))
            })?);
            if !record.work_packages_json.trim().is_empty() {
                work_packages =
                    serde_json::from_str(&record.work_packages_json).map_err(|err| {
                        PersistenceError::InvalidData(format!("invalid work packages json: {err}"))
                    })?;
            }
            continue;
        }
        tasks.push(record.into_task()?);
    }

    super::validate_tasks(&tasks)?;
    let mut plan = ProjectPlan::from_parts(metadata.unwrap_or_default(), work_packages);
    for task in tasks {
        plan.upsert_task_record(task)?;
    }
    Ok(plan)
}
