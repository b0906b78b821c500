use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Precedence relation between a predecessor (the dependency source) and
/// the task that declares the dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-Start: the task starts after the predecessor finishes.
    FS,
    /// Start-to-Start: the task starts after the predecessor starts.
    SS,
    /// Finish-to-Finish: the task finishes after the predecessor finishes.
    FF,
    /// Start-to-Finish: the task finishes after the predecessor starts.
    SF,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FS => "FS",
            DependencyType::SS => "SS",
            DependencyType::FF => "FF",
            DependencyType::SF => "SF",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS" => Ok(DependencyType::FS),
            "SS" => Ok(DependencyType::SS),
            "FF" => Ok(DependencyType::FF),
            "SF" => Ok(DependencyType::SF),
            other => Err(format!("unknown dependency type '{other}'")),
        }
    }
}

/// A single precedence edge. `source_id` names the controlling task; a
/// source that no longer exists is tolerated and ignored by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "type")]
    pub kind: DependencyType,
}

impl Dependency {
    pub fn new(source_id: impl Into<String>, kind: DependencyType) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
        }
    }

    pub fn finish_to_start(source_id: impl Into<String>) -> Self {
        Self::new(source_id, DependencyType::FS)
    }
}

/// Atomic schedulable unit. Field names on the wire match the project
/// document format (`duration`, `workPackageId`, `constraintDate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_days: i64,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(rename = "workPackageId")]
    pub work_package_id: String,
    /// Optional "start no earlier than" floor on the computed early start.
    #[serde(
        rename = "constraintDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub constraint_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        duration_days: i64,
        work_package_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_days,
            dependencies: Vec::new(),
            work_package_id: work_package_id.into(),
            constraint_date: None,
        }
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_constraint_date(mut self, date: NaiveDate) -> Self {
        self.constraint_date = Some(date);
        self
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(6);

        let id_data: [&str; 1] = [self.id.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let name_data: [&str; 1] = [self.name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("name"), name_data).into_column());

        let duration_data: [i64; 1] = [self.duration_days];
        columns.push(
            Series::new(PlSmallStr::from_static("duration_days"), duration_data).into_column(),
        );

        let dependencies_json = serde_json::to_string(&self.dependencies)
            .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?;
        let dependencies_data: [&str; 1] = [dependencies_json.as_str()];
        columns.push(
            Series::new(PlSmallStr::from_static("dependencies"), dependencies_data).into_column(),
        );

        let wp_data: [&str; 1] = [self.work_package_id.as_str()];
        columns
            .push(Series::new(PlSmallStr::from_static("work_package_id"), wp_data).into_column());

        let constraint_data: [Option<i32>; 1] = [self.constraint_date.map(Self::date_to_i32)];
        columns.push(
            Series::new(PlSmallStr::from_static("constraint_date"), constraint_data)
                .cast(&DataType::Date)?
                .into_column(),
        );

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .str()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("task row missing id".into()))?
            .to_string();

        let name = df
            .column("name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let duration_days = df.column("duration_days")?.i64()?.get(row_idx).unwrap_or(0);

        let dependencies = match df.column("dependencies")?.str()?.get(row_idx) {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(json)
                .map_err(|err| PolarsError::ComputeError(err.to_string().into()))?,
            _ => Vec::new(),
        };

        let work_package_id = df
            .column("work_package_id")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let constraint_date = df
            .column("constraint_date")?
            .date()?
            .get(row_idx)
            .map(Self::date_from_i32);

        Ok(Self {
            id,
            name,
            duration_days,
            dependencies,
            work_package_id,
            constraint_date,
        })
    }

    fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}

/// Named grouping of tasks. Its temporal extent is entirely derived from
/// the tasks assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPackage {
    pub id: String,
    pub name: String,
}

impl WorkPackage {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
