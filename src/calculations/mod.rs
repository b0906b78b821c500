pub mod backward_pass;
pub mod forward_pass;

use std::collections::HashMap;

/// Sweep limit for the fixed-point relaxation. Only a dependency cycle can
/// keep the values changing this long.
pub(crate) fn iteration_cap(task_count: usize) -> usize {
    2 * task_count + 50
}

/// Start/finish day-offsets per task id, plus whether the relaxation
/// reached a fixed point before hitting the iteration cap.
pub struct PassValues {
    pub offsets: HashMap<String, (i64, i64)>,
    pub converged: bool,
}
