pub mod calculations;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod metadata;
pub mod persistence;
pub mod project;
pub mod schedule;
pub mod task;
pub(crate) mod task_validation;

pub use metadata::ProjectMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, load_project_from_csv, load_project_from_json,
    save_project_to_csv, save_project_to_json, validate_plan, validate_tasks,
};
pub use project::{ProjectPlan, RefreshSummary};
pub use schedule::{
    ProjectStats, ScheduleResult, ScheduleWarning, ScheduledTask, ScheduledWorkPackage, add_days,
    compute_schedule,
};
pub use task::{Dependency, DependencyType, Task, WorkPackage};
