use crate::metadata::ProjectMetadata;
use crate::schedule::{ScheduleResult, add_days, compute_schedule};
use crate::task::{Dependency, Task, WorkPackage};
use crate::task_validation::{self, TaskValidationError};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<String>,
    pub latest_finish: Option<NaiveDate>,
    pub has_cycle_warning: bool,
}

impl RefreshSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        if let Some(date) = self.latest_finish {
            parts.push(format!("finish={}", date));
        }
        if self.has_cycle_warning {
            parts.push("warning=possible_cycle".to_string());
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

/// The canonical project store: owns the task table (a polars DataFrame),
/// the work packages, and the project metadata. The schedule engine only
/// ever sees read-only snapshots pulled out of here; computed values are
/// never written back into the table.
#[derive(Debug)]
pub struct ProjectPlan {
    df: DataFrame,
    metadata: ProjectMetadata,
    work_packages: Vec<WorkPackage>,
}

impl ProjectPlan {
    pub(crate) fn from_parts(metadata: ProjectMetadata, work_packages: Vec<WorkPackage>) -> Self {
        let schema = Self::default_schema();
        Self {
            df: DataFrame::empty_with_schema(&schema),
            metadata,
            work_packages,
        }
    }

    pub fn new() -> Self {
        Self::from_parts(ProjectMetadata::default(), Vec::new())
    }

    pub fn new_with_metadata(metadata: ProjectMetadata) -> Self {
        Self::from_parts(metadata, Vec::new())
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::String),
            Field::new("name".into(), DataType::String),
            Field::new("duration_days".into(), DataType::Int64),
            Field::new("dependencies".into(), DataType::String),
            Field::new("work_package_id".into(), DataType::String),
            Field::new("constraint_date".into(), DataType::Date),
        ])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn project_start_date(&self) -> NaiveDate {
        self.metadata.project_start_date
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.metadata.project_name = name.into();
    }

    pub fn set_project_description(&mut self, description: impl Into<String>) {
        self.metadata.project_description = description.into();
    }

    pub fn work_packages(&self) -> &[WorkPackage] {
        &self.work_packages
    }

    pub fn upsert_work_package(&mut self, work_package: WorkPackage) {
        if let Some(existing) = self
            .work_packages
            .iter_mut()
            .find(|wp| wp.id == work_package.id)
        {
            *existing = work_package;
        } else {
            self.work_packages.push(work_package);
        }
    }

    /// Removes a work package. Member tasks keep their now-dangling
    /// `work_package_id`; the engine schedules them but drops them from
    /// package aggregates.
    pub fn delete_work_package(&mut self, work_package_id: &str) -> bool {
        let before = self.work_packages.len();
        self.work_packages.retain(|wp| wp.id != work_package_id);
        self.work_packages.len() != before
    }

    pub fn tasks(&self) -> Result<Vec<Task>, PolarsError> {
        let df = self.dataframe();
        let mut tasks = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            tasks.push(Task::from_dataframe_row(df, idx)?);
        }
        Ok(tasks)
    }

    pub fn find_task(&self, task_id: &str) -> Result<Option<Task>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.str()?;
        for (idx, id_opt) in ids.into_iter().enumerate() {
            if id_opt == Some(task_id) {
                let task = Task::from_dataframe_row(self.dataframe(), idx)?;
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    /// Deletes a task and strips every dependency that referenced it, so
    /// the table never accumulates references the user can no longer see.
    pub fn delete_task(&mut self, task_id: &str) -> Result<bool, PolarsError> {
        if self.df.height() == 0 {
            return Ok(false);
        }
        let snapshot = self.df.clone();
        let mut tasks: Vec<Task> = Vec::with_capacity(snapshot.height());
        let mut found = false;
        for idx in 0..snapshot.height() {
            let mut task = Task::from_dataframe_row(&snapshot, idx)?;
            if task.id == task_id {
                found = true;
                continue;
            }
            task.dependencies.retain(|dep| dep.source_id != task_id);
            tasks.push(task);
        }
        if !found {
            return Ok(false);
        }

        self.df = DataFrame::empty_with_schema(&Self::default_schema());
        for task in tasks {
            self.upsert_task_record(task)?;
        }
        Ok(true)
    }

    fn validation_error(err: TaskValidationError) -> PolarsError {
        PolarsError::ComputeError(err.to_string().into())
    }

    pub fn upsert_task(
        &mut self,
        id: &str,
        name: &str,
        duration_days: i64,
        work_package_id: &str,
    ) -> Result<(), PolarsError> {
        self.upsert_task_record(Task::new(id, name, duration_days, work_package_id))
    }

    pub fn upsert_task_record(&mut self, task: Task) -> Result<(), PolarsError> {
        task_validation::validate_task(&task).map_err(Self::validation_error)?;
        let id_exists = if self.df.height() == 0 {
            false
        } else {
            self.df
                .column("id")?
                .str()?
                .into_iter()
                .any(|v| v == Some(task.id.as_str()))
        };

        if id_exists {
            self.update_string_column("name", &task.id, &task.name)?;
            self.update_i64_column("duration_days", &task.id, task.duration_days)?;
            let dependencies_json = serde_json::to_string(&task.dependencies)
                .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;
            self.update_string_column("dependencies", &task.id, &dependencies_json)?;
            self.update_string_column("work_package_id", &task.id, &task.work_package_id)?;
            self.update_date_column("constraint_date", &task.id, task.constraint_date)?;
            return Ok(());
        }

        let new_row = task.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        Ok(())
    }

    pub fn set_dependencies(
        &mut self,
        task_id: &str,
        dependencies: Vec<Dependency>,
    ) -> Result<(), PolarsError> {
        let mut task = self.find_task(task_id)?.ok_or_else(|| {
            PolarsError::ComputeError(format!("task {task_id} not found").into())
        })?;
        task.dependencies = dependencies;
        self.upsert_task_record(task)
    }

    pub fn set_constraint_date(
        &mut self,
        task_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<(), PolarsError> {
        if self.find_task(task_id)?.is_none() {
            return Err(PolarsError::ComputeError(
                format!("task {task_id} not found").into(),
            ));
        }
        self.update_date_column("constraint_date", task_id, date)
    }

    /// Moves the project start and shifts every task's `constraint_date`,
    /// when present, by the same day delta so the plan keeps its relative
    /// structure.
    pub fn set_project_start_date(&mut self, new_start: NaiveDate) -> Result<(), PolarsError> {
        let delta = (new_start - self.metadata.project_start_date).num_days();
        if delta != 0 {
            for task in self.tasks()? {
                if let Some(constraint) = task.constraint_date {
                    self.update_date_column(
                        "constraint_date",
                        &task.id,
                        Some(add_days(constraint, delta)),
                    )?;
                }
            }
        }
        self.metadata.project_start_date = new_start;
        Ok(())
    }

    /// Pins the project end by deriving the start from the current
    /// computed duration and delegating to the same bulk shift.
    pub fn set_project_end_date(&mut self, new_end: NaiveDate) -> Result<(), PolarsError> {
        let duration = self.compute()?.stats.duration;
        self.set_project_start_date(add_days(new_end, -duration))
    }

    /// Full recomputation from scratch; nothing is cached between calls.
    pub fn compute(&self) -> Result<ScheduleResult, PolarsError> {
        Ok(compute_schedule(
            &self.tasks()?,
            &self.work_packages,
            self.metadata.project_start_date,
        ))
    }

    pub fn refresh(&self) -> Result<RefreshSummary, PolarsError> {
        let result = self.compute()?;

        let critical_count = result.tasks.iter().filter(|st| st.is_critical).count();
        let latest_finish = result.tasks.iter().map(|st| st.end_date).max();

        let mut critical_path: Vec<(i64, String)> = result
            .tasks
            .iter()
            .filter(|st| st.is_critical)
            .map(|st| (st.early_start, st.task.id.clone()))
            .collect();
        critical_path.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        Ok(RefreshSummary {
            task_count: result.tasks.len(),
            critical_count,
            critical_path: critical_path.into_iter().map(|(_, id)| id).collect(),
            latest_finish,
            has_cycle_warning: !result.warnings.is_empty(),
        })
    }

    fn update_string_column(
        &mut self,
        column_name: &str,
        task_id: &str,
        new_value: &str,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.str()?.into_iter())
            .map(|(val, id)| if id == Some(task_id) { Some(new_value) } else { val })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_i64_column(
        &mut self,
        column_name: &str,
        task_id: &str,
        new_value: i64,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .i64()?
            .into_iter()
            .zip(id_col.str()?.into_iter())
            .map(|(val, id)| if id == Some(task_id) { Some(new_value) } else { val })
            .collect::<Int64Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_date_column(
        &mut self,
        column_name: &str,
        task_id: &str,
        new_date: Option<NaiveDate>,
    ) -> Result<(), PolarsError> {
        let replacement = match new_date {
            Some(date) => lit(date).cast(DataType::Date),
            None => lit(NULL).cast(DataType::Date),
        };
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(task_id.to_string())))
                    .then(replacement)
                    .otherwise(col(column_name).cast(DataType::Date))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }
}

impl Default for ProjectPlan {
    fn default() -> Self {
        Self::new()
    }
}
