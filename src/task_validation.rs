use crate::task::Task;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskValidationError {}

/// Structural admission checks. The schedule engine itself tolerates all of
/// these shapes; they are rejected here before a task enters the plan.
pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::new("task id must not be empty"));
    }

    if task.name.trim().is_empty() {
        return Err(TaskValidationError::new(format!(
            "task {} must have a non-empty name",
            task.id
        )));
    }

    if task.duration_days < 1 {
        return Err(TaskValidationError::new(format!(
            "task {} has duration {} (must be at least 1 day)",
            task.id, task.duration_days
        )));
    }

    for dependency in &task.dependencies {
        if dependency.source_id == task.id {
            return Err(TaskValidationError::new(format!(
                "task {} depends on itself",
                task.id
            )));
        }
    }

    Ok(())
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::new(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        validate_task(task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Dependency;

    #[test]
    fn rejects_empty_name_and_zero_duration() {
        let unnamed = Task::new("t-1", "  ", 3, "wp-1");
        assert!(validate_task(&unnamed).is_err());

        let instant = Task::new("t-1", "Kickoff", 0, "wp-1");
        assert!(validate_task(&instant).is_err());
    }

    #[test]
    fn rejects_self_referencing_dependency() {
        let task = Task::new("t-1", "Loop", 2, "wp-1")
            .with_dependency(Dependency::finish_to_start("t-1"));
        assert!(validate_task(&task).is_err());
    }

    #[test]
    fn rejects_duplicate_ids_in_collection() {
        let tasks = vec![
            Task::new("t-1", "A", 1, "wp-1"),
            Task::new("t-1", "B", 2, "wp-1"),
        ];
        assert!(validate_task_collection(&tasks).is_err());
    }
}
