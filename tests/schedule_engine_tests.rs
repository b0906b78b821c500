use chrono::NaiveDate;
use plan_tool::{
    Dependency, DependencyType, ScheduleWarning, Task, WorkPackage, add_days, compute_schedule,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn task(id: &str, duration: i64) -> Task {
    Task::new(id, format!("Task {id}"), duration, "wp-1")
}

fn find<'a>(result: &'a plan_tool::ScheduleResult, id: &str) -> &'a plan_tool::ScheduledTask {
    result
        .tasks
        .iter()
        .find(|st| st.task.id == id)
        .unwrap_or_else(|| panic!("task {id} missing from result"))
}

#[test]
fn identical_input_produces_identical_output() {
    let tasks = vec![
        task("a", 2),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
        task("c", 1).with_dependency(Dependency::new("a", DependencyType::SS)),
    ];
    let wps = vec![WorkPackage::new("wp-1", "Planning")];
    let start = d(2025, 3, 3);

    let first = compute_schedule(&tasks, &wps, start);
    let second = compute_schedule(&tasks, &wps, start);
    assert_eq!(first, second);
}

#[test]
fn engine_does_not_mutate_inputs() {
    let tasks = vec![
        task("a", 2),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
    ];
    let wps = vec![WorkPackage::new("wp-1", "Planning")];
    let tasks_before = tasks.clone();
    let wps_before = wps.clone();

    let _ = compute_schedule(&tasks, &wps, d(2025, 3, 3));

    assert_eq!(tasks, tasks_before);
    assert_eq!(wps, wps_before);
}

#[test]
fn single_task_baseline() {
    let tasks = vec![task("solo", 3)];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    let solo = find(&result, "solo");
    assert_eq!(solo.early_start, 0);
    assert_eq!(solo.early_finish, 3);
    assert_eq!(solo.slack, 0);
    assert!(solo.is_critical);
    assert_eq!(solo.start_date, d(2025, 1, 6));
    assert_eq!(solo.end_date, d(2025, 1, 9));
    assert_eq!(result.stats.duration, 3);
}

#[test]
fn finish_to_start_chain() {
    let tasks = vec![
        task("a", 2),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
        task("c", 1).with_dependency(Dependency::finish_to_start("b")),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    assert_eq!(
        (find(&result, "a").early_start, find(&result, "a").early_finish),
        (0, 2)
    );
    assert_eq!(
        (find(&result, "b").early_start, find(&result, "b").early_finish),
        (2, 5)
    );
    assert_eq!(
        (find(&result, "c").early_start, find(&result, "c").early_finish),
        (5, 6)
    );
    assert_eq!(result.stats.duration, 6);
    assert!(result.tasks.iter().all(|st| st.is_critical));
}

#[test]
fn chain_converges_regardless_of_listing_order() {
    // Successors listed before their predecessors.
    let tasks = vec![
        task("c", 1).with_dependency(Dependency::finish_to_start("b")),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
        task("a", 2),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    assert_eq!(find(&result, "c").early_start, 5);
    assert_eq!(result.stats.duration, 6);
}

#[test]
fn parallel_branches_get_slack() {
    let tasks = vec![
        task("a", 2),
        task("b", 5).with_dependency(Dependency::finish_to_start("a")),
        task("c", 1).with_dependency(Dependency::finish_to_start("a")),
        task("d", 1)
            .with_dependency(Dependency::finish_to_start("b"))
            .with_dependency(Dependency::finish_to_start("c")),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    assert_eq!(result.stats.duration, 8);

    let c = find(&result, "c");
    assert_eq!(c.early_finish, 3);
    assert_eq!(c.late_finish, 7);
    assert_eq!(c.slack, 4);
    assert!(!c.is_critical);

    for id in ["a", "b", "d"] {
        let st = find(&result, id);
        assert_eq!(st.slack, 0, "task {id} should have zero slack");
        assert!(st.is_critical, "task {id} should be critical");
    }
}

#[test]
fn start_to_start_semantics() {
    let tasks = vec![
        task("a", 4),
        task("b", 2).with_dependency(Dependency::new("a", DependencyType::SS)),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    let b = find(&result, "b");
    assert_eq!(b.early_start, 0);
    assert_eq!(b.early_finish, 2);
}

#[test]
fn finish_to_finish_semantics() {
    let tasks = vec![
        task("a", 4),
        task("c", 3).with_dependency(Dependency::new("a", DependencyType::FF)),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    let a = find(&result, "a");
    let c = find(&result, "c");
    assert!(c.early_finish >= a.early_finish);
    assert_eq!(c.early_start, 1); // max(0, a.EF - duration) = 4 - 3
    assert_eq!(c.early_finish, 4);
}

#[test]
fn start_to_finish_semantics() {
    // The predecessor's start is pushed out by a constraint so the SF
    // floor is visible above zero.
    let start = d(2025, 1, 6);
    let tasks = vec![
        task("a", 4).with_constraint_date(add_days(start, 5)),
        task("b", 2).with_dependency(Dependency::new("a", DependencyType::SF)),
    ];
    let result = compute_schedule(&tasks, &[], start);

    let b = find(&result, "b");
    // ES >= a.ES - duration = 5 - 2
    assert_eq!(b.early_start, 3);
    assert_eq!(b.early_finish, 5);
}

#[test]
fn dangling_dependency_is_ignored() {
    let tasks = vec![task("a", 3).with_dependency(Dependency::finish_to_start("ghost"))];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    let a = find(&result, "a");
    assert_eq!(a.early_start, 0);
    assert_eq!(a.early_finish, 3);
    assert!(result.warnings.is_empty());
}

#[test]
fn cycle_terminates_with_warning() {
    let tasks = vec![
        task("a", 2).with_dependency(Dependency::finish_to_start("b")),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
    ];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    assert_eq!(result.tasks.len(), 2);
    assert!(
        result
            .warnings
            .contains(&ScheduleWarning::PossibleCircularDependency)
    );
}

#[test]
fn self_loop_is_a_degenerate_cycle() {
    let tasks = vec![task("a", 2).with_dependency(Dependency::finish_to_start("a"))];
    let result = compute_schedule(&tasks, &[], d(2025, 1, 6));

    assert_eq!(result.tasks.len(), 1);
    assert!(
        result
            .warnings
            .contains(&ScheduleWarning::PossibleCircularDependency)
    );
}

#[test]
fn constraint_date_is_a_hard_floor() {
    let start = d(2025, 1, 6);
    let tasks = vec![
        task("a", 2),
        task("b", 3)
            .with_dependency(Dependency::finish_to_start("a"))
            .with_constraint_date(add_days(start, 5)),
    ];
    let result = compute_schedule(&tasks, &[], start);

    // Dependency floor is 2, constraint floor is 5; the constraint wins.
    let b = find(&result, "b");
    assert_eq!(b.early_start, 5);
    assert_eq!(b.early_finish, 8);
    assert_eq!(b.start_date, d(2025, 1, 11));
}

#[test]
fn constraint_before_project_start_is_clamped() {
    let start = d(2025, 1, 6);
    let tasks = vec![task("a", 2).with_constraint_date(add_days(start, -10))];
    let result = compute_schedule(&tasks, &[], start);

    assert_eq!(find(&result, "a").early_start, 0);
}

#[test]
fn work_package_aggregation_spans_member_tasks() {
    let start = d(2025, 1, 6);
    // Member windows [0,2] and [3,7].
    let tasks = vec![
        task("a", 2),
        task("b", 4).with_constraint_date(add_days(start, 3)),
    ];
    let wps = vec![WorkPackage::new("wp-1", "Planning")];
    let result = compute_schedule(&tasks, &wps, start);

    let wp = &result.work_packages[0];
    assert_eq!(wp.start_date, start);
    assert_eq!(wp.end_date, add_days(start, 7));
    assert_eq!(wp.duration_days, 7);
}

#[test]
fn empty_work_package_collapses_to_project_start() {
    let start = d(2025, 1, 6);
    let wps = vec![WorkPackage::new("wp-empty", "Nothing here")];
    let result = compute_schedule(&[task("a", 2)], &wps, start);

    let wp = result
        .work_packages
        .iter()
        .find(|wp| wp.work_package.id == "wp-empty")
        .unwrap();
    assert_eq!(wp.start_date, start);
    assert_eq!(wp.end_date, start);
    assert_eq!(wp.duration_days, 0);
}

#[test]
fn task_with_dangling_work_package_is_scheduled_but_not_aggregated() {
    let start = d(2025, 1, 6);
    let tasks = vec![
        task("a", 2),
        Task::new("orphan", "Orphan", 9, "wp-deleted"),
    ];
    let wps = vec![WorkPackage::new("wp-1", "Planning")];
    let result = compute_schedule(&tasks, &wps, start);

    // Scheduled normally and it drives the project duration.
    assert_eq!(find(&result, "orphan").early_finish, 9);
    assert_eq!(result.stats.duration, 9);

    // Not part of wp-1's span.
    let wp = &result.work_packages[0];
    assert_eq!(wp.duration_days, 2);
}

#[test]
fn stats_duration_matches_critical_path_length() {
    let tasks = vec![
        task("a", 2),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
    ];
    let start = d(2025, 1, 6);
    let result = compute_schedule(&tasks, &[], start);

    assert_eq!(result.stats.duration, result.stats.critical_path_length);
    assert_eq!(result.stats.start_date, start);
    assert_eq!(result.stats.end_date, add_days(start, 5));
}
