use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::graph::PlanDag;
use crate::task::{Task, WorkPackage};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day-offset arithmetic is naive/local; offsets are the canonical values
/// and absolute dates are always derived through this single helper.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// A task annotated with the computed schedule. Offsets are integer days
/// from the project start; `start_date`/`end_date` are pure projections of
/// the early offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub task: Task,
    #[serde(rename = "earlyStart")]
    pub early_start: i64,
    #[serde(rename = "earlyFinish")]
    pub early_finish: i64,
    #[serde(rename = "lateStart")]
    pub late_start: i64,
    #[serde(rename = "lateFinish")]
    pub late_finish: i64,
    pub slack: i64,
    #[serde(rename = "isCritical")]
    pub is_critical: bool,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledWorkPackage {
    #[serde(flatten)]
    pub work_package: WorkPackage,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "duration")]
    pub duration_days: i64,
}

/// Whole-project aggregates. `duration` and `critical_path_length` are
/// numerically identical but communicate different concepts to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub duration: i64,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "criticalPathLength")]
    pub critical_path_length: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    /// The relaxation hit its iteration cap; the returned values are the
    /// last computed ones and may be internally inconsistent.
    PossibleCircularDependency,
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::PossibleCircularDependency => {
                write!(f, "possible circular dependency")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub tasks: Vec<ScheduledTask>,
    #[serde(rename = "workPackages")]
    pub work_packages: Vec<ScheduledWorkPackage>,
    pub stats: ProjectStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScheduleWarning>,
}

/// Critical Path Method over the full task graph. Pure and deterministic:
/// inputs are never mutated, nothing is cached across calls, and identical
/// input produces identical output. Data problems degrade gracefully
/// instead of erroring — dangling dependency sources are ignored, a
/// dependency cycle is bounded by the pass iteration cap and reported as a
/// warning, and empty input yields a well-formed zero-duration result.
pub fn compute_schedule(
    tasks: &[Task],
    work_packages: &[WorkPackage],
    project_start: NaiveDate,
) -> ScheduleResult {
    let dag = PlanDag::build(tasks);

    // Precedence order when the graph is acyclic; the fixed point is the
    // same either way, sweeping in order just converges faster.
    let forward_order: Vec<usize> = dag
        .topo_order()
        .unwrap_or_else(|| (0..tasks.len()).collect());
    let mut backward_order = forward_order.clone();
    backward_order.reverse();

    let early = ForwardPass::new(tasks).execute(project_start, &forward_order);

    let project_duration = early
        .offsets
        .values()
        .map(|&(_, early_finish)| early_finish)
        .max()
        .unwrap_or(0)
        .max(0);

    let late = BackwardPass::new(tasks).execute(project_duration, &backward_order);

    let mut warnings = Vec::new();
    if !early.converged || !late.converged {
        tracing::warn!(
            task_count = tasks.len(),
            "relaxation hit its iteration cap; possible circular dependency"
        );
        warnings.push(ScheduleWarning::PossibleCircularDependency);
    }

    let scheduled_tasks: Vec<ScheduledTask> = tasks
        .iter()
        .map(|task| {
            let (early_start, early_finish) =
                early.offsets.get(&task.id).copied().unwrap_or((0, 0));
            let (late_start, late_finish) = late
                .offsets
                .get(&task.id)
                .copied()
                .unwrap_or((project_duration, project_duration));
            let slack = late_start - early_start;
            ScheduledTask {
                task: task.clone(),
                early_start,
                early_finish,
                late_start,
                late_finish,
                slack,
                // <= absorbs negative slack from constraint interactions.
                is_critical: slack <= 0,
                start_date: add_days(project_start, early_start),
                end_date: add_days(project_start, early_finish),
            }
        })
        .collect();

    let scheduled_work_packages: Vec<ScheduledWorkPackage> = work_packages
        .iter()
        .map(|wp| aggregate_work_package(wp, &scheduled_tasks, project_start))
        .collect();

    let stats = ProjectStats {
        duration: project_duration,
        start_date: project_start,
        end_date: add_days(project_start, project_duration),
        critical_path_length: project_duration,
    };

    ScheduleResult {
        tasks: scheduled_tasks,
        work_packages: scheduled_work_packages,
        stats,
        warnings,
    }
}

fn aggregate_work_package(
    work_package: &WorkPackage,
    scheduled_tasks: &[ScheduledTask],
    project_start: NaiveDate,
) -> ScheduledWorkPackage {
    let members: Vec<&ScheduledTask> = scheduled_tasks
        .iter()
        .filter(|st| st.task.work_package_id == work_package.id)
        .collect();

    // An empty package collapses to the project start.
    if members.is_empty() {
        return ScheduledWorkPackage {
            work_package: work_package.clone(),
            start_date: project_start,
            end_date: project_start,
            duration_days: 0,
        };
    }

    let min_start = members.iter().map(|st| st.early_start).min().unwrap_or(0);
    let max_finish = members.iter().map(|st| st.early_finish).max().unwrap_or(0);

    ScheduledWorkPackage {
        work_package: work_package.clone(),
        start_date: add_days(project_start, min_start),
        end_date: add_days(project_start, max_finish),
        duration_days: max_finish - min_start,
    }
}
