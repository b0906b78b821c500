use super::{PassValues, iteration_cap};
use crate::task::{DependencyType, Task};
use std::collections::HashMap;

/// Late start / late finish computation, the mirror of the forward pass.
/// Every task starts at `late_finish = project_duration` and is tightened
/// to the minimum ceiling implied by the successors that list it as a
/// dependency source, again by relaxation to a fixed point.
pub struct BackwardPass<'a> {
    tasks: &'a [Task],
}

impl<'a> BackwardPass<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        Self { tasks }
    }

    pub fn execute(&self, project_duration: i64, sweep_order: &[usize]) -> PassValues {
        let index_of: HashMap<&str, usize> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id.as_str(), idx))
            .collect();

        // Successor adjacency: for each task, the tasks that reference it
        // as a dependency source and through which relation type.
        let mut successors: Vec<Vec<(usize, DependencyType)>> = vec![Vec::new(); self.tasks.len()];
        for (succ_idx, task) in self.tasks.iter().enumerate() {
            for dependency in &task.dependencies {
                if let Some(&pred_idx) = index_of.get(dependency.source_id.as_str()) {
                    successors[pred_idx].push((succ_idx, dependency.kind));
                }
            }
        }

        let mut late: Vec<(i64, i64)> = self
            .tasks
            .iter()
            .map(|task| (project_duration - task.duration_days, project_duration))
            .collect();

        let cap = iteration_cap(self.tasks.len());
        let mut iterations = 0;
        let mut changed = true;

        while changed && iterations < cap {
            changed = false;
            iterations += 1;

            for &idx in sweep_order {
                let task = &self.tasks[idx];
                let mut new_lf = project_duration;

                for &(succ_idx, kind) in &successors[idx] {
                    let (succ_ls, succ_lf) = late[succ_idx];
                    let implied = match kind {
                        DependencyType::FS => succ_ls,
                        DependencyType::SS => succ_ls + task.duration_days,
                        DependencyType::FF => succ_lf,
                        DependencyType::SF => succ_lf + task.duration_days,
                    };
                    if implied < new_lf {
                        new_lf = implied;
                    }
                }

                let new_ls = new_lf - task.duration_days;

                if late[idx] != (new_ls, new_lf) {
                    late[idx] = (new_ls, new_lf);
                    changed = true;
                }
            }
        }

        let offsets = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id.clone(), late[idx]))
            .collect();

        PassValues {
            offsets,
            converged: !changed,
        }
    }
}
