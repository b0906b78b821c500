use super::{PassValues, iteration_cap};
use crate::task::{DependencyType, Task};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Early start / early finish computation by repeated full-sweep
/// relaxation. Each sweep recomputes every task's floor from its
/// predecessors' current values; the loop stops at a fixed point or at the
/// iteration cap. No topological order is required, but `sweep_order`
/// controls the visit order within a sweep, so feeding a precedence order
/// makes acyclic graphs converge in very few sweeps.
pub struct ForwardPass<'a> {
    tasks: &'a [Task],
}

impl<'a> ForwardPass<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        Self { tasks }
    }

    pub fn execute(&self, project_start: NaiveDate, sweep_order: &[usize]) -> PassValues {
        let index_of: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id.as_str(), idx))
            .collect();

        // Hard floor from the optional "start no earlier than" date,
        // expressed as a day-offset from the project start.
        let constraint_floors: Vec<Option<i64>> = self
            .tasks
            .iter()
            .map(|task| {
                task.constraint_date
                    .map(|date| (date - project_start).num_days())
            })
            .collect();

        let mut early: Vec<(i64, i64)> = self
            .tasks
            .iter()
            .map(|task| (0, task.duration_days))
            .collect();

        let cap = iteration_cap(self.tasks.len());
        let mut iterations = 0;
        let mut changed = true;

        while changed && iterations < cap {
            changed = false;
            iterations += 1;

            for &idx in sweep_order {
                let task = &self.tasks[idx];
                let mut new_es = 0i64;

                for dependency in &task.dependencies {
                    // Deleted predecessors are treated as absent constraints.
                    let Some(&pred_idx) = index_of.get(dependency.source_id.as_str()) else {
                        continue;
                    };
                    let (pred_es, pred_ef) = early[pred_idx];
                    let implied = match dependency.kind {
                        DependencyType::FS => pred_ef,
                        DependencyType::SS => pred_es,
                        DependencyType::FF => pred_ef - task.duration_days,
                        DependencyType::SF => pred_es - task.duration_days,
                    };
                    if implied > new_es {
                        new_es = implied;
                    }
                }

                if let Some(floor) = constraint_floors[idx] {
                    if floor > new_es {
                        new_es = floor;
                    }
                }

                new_es = new_es.max(0);
                let new_ef = new_es + task.duration_days;

                if early[idx] != (new_es, new_ef) {
                    early[idx] = (new_es, new_ef);
                    changed = true;
                }
            }
        }

        let offsets = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id.clone(), early[idx]))
            .collect();

        PassValues {
            offsets,
            converged: !changed,
        }
    }
}
