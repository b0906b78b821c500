use chrono::NaiveDate;
use plan_tool::{
    Dependency, DependencyType, PersistenceError, ProjectMetadata, ProjectPlan, Task, WorkPackage,
    load_project_from_csv, load_project_from_json, save_project_to_csv, save_project_to_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn build_sample_plan() -> ProjectPlan {
    let metadata = ProjectMetadata {
        project_name: "New Software Launch".into(),
        project_description: "End-to-end development and deployment plan".into(),
        project_start_date: d(2025, 1, 6),
    };
    let mut plan = ProjectPlan::new_with_metadata(metadata);
    plan.upsert_work_package(WorkPackage::new("wp-1", "Planning"));
    plan.upsert_work_package(WorkPackage::new("wp-2", "Execution"));

    plan.upsert_task("t-1", "Define Scope", 2, "wp-1").unwrap();
    plan.upsert_task_record(
        Task::new("t-2", "Resource Allocation", 3, "wp-1")
            .with_dependency(Dependency::finish_to_start("t-1"))
            .with_constraint_date(d(2025, 1, 10)),
    )
    .unwrap();
    plan.upsert_task_record(
        Task::new("t-3", "Development", 5, "wp-2")
            .with_dependency(Dependency::finish_to_start("t-2"))
            .with_dependency(Dependency::new("t-1", DependencyType::SS)),
    )
    .unwrap();
    plan
}

#[test]
fn json_round_trip_preserves_plan() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_project_to_json(&plan, file.path()).unwrap();
    let loaded = load_project_from_json(file.path()).unwrap();

    assert_eq!(loaded.metadata(), plan.metadata());
    assert_eq!(loaded.work_packages(), plan.work_packages());
    assert_eq!(loaded.tasks().unwrap(), plan.tasks().unwrap());
}

#[test]
fn json_uses_the_project_document_wire_names() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    save_project_to_json(&plan, file.path()).unwrap();

    let raw = std::fs::read_to_string(file.path()).unwrap();
    for key in [
        "\"startDate\"",
        "\"workPackages\"",
        "\"workPackageId\"",
        "\"sourceId\"",
        "\"type\"",
        "\"duration\"",
        "\"constraintDate\"",
    ] {
        assert!(raw.contains(key), "expected key {key} in exported JSON");
    }
    // Internal field names must not leak into the document.
    assert!(!raw.contains("duration_days"));
    assert!(!raw.contains("work_package_id"));
}

#[test]
fn json_loads_documents_exported_by_the_planning_ui() {
    let document = r#"{
        "id": "proj-1",
        "title": "New Software Launch",
        "description": "End-to-end development and deployment plan",
        "startDate": "2025-01-06",
        "workPackages": [
            { "id": "wp-1", "name": "Planning" },
            { "id": "wp-2", "name": "Execution" }
        ],
        "tasks": [
            { "id": "t-1", "name": "Define Scope", "duration": 2, "dependencies": [], "workPackageId": "wp-1" },
            { "id": "t-2", "name": "Resource Allocation", "duration": 3,
              "dependencies": [{ "sourceId": "t-1", "type": "FS" }], "workPackageId": "wp-1" },
            { "id": "t-3", "name": "Development", "duration": 5,
              "dependencies": [{ "sourceId": "t-2", "type": "FS" }], "workPackageId": "wp-2" }
        ]
    }"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(document.as_bytes()).unwrap();

    let plan = load_project_from_json(file.path()).unwrap();
    assert_eq!(plan.metadata().project_name, "New Software Launch");
    assert_eq!(plan.project_start_date(), d(2025, 1, 6));
    assert_eq!(plan.work_packages().len(), 2);

    let result = plan.compute().unwrap();
    assert_eq!(result.stats.duration, 10);
}

#[test]
fn csv_round_trip_preserves_plan() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_project_to_csv(&plan, file.path()).unwrap();
    let loaded = load_project_from_csv(file.path()).unwrap();

    assert_eq!(loaded.metadata(), plan.metadata());
    assert_eq!(loaded.work_packages(), plan.work_packages());
    assert_eq!(loaded.tasks().unwrap(), plan.tasks().unwrap());
}

#[test]
fn csv_with_bad_dependency_entry_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "id,name,duration_days,dependencies,work_package_id,constraint_date,metadata_json,work_packages_json"
    )
    .unwrap();
    writeln!(file, "t-1,Broken,2,not-a-dependency,wp-1,,,").unwrap();

    match load_project_from_csv(file.path()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("dependency"), "unexpected message: {msg}");
        }
        other => panic!("expected InvalidData, got {other:?}"),
    }
}

#[test]
fn save_rejects_invalid_stored_state() {
    // A plan built through the API is always valid, so corrupt one task
    // through a fresh record that bypasses nothing: duplicate ids cannot
    // happen, but an importing caller may hand us a zero-duration task.
    let document = r#"{
        "title": "Broken",
        "startDate": "2025-01-06",
        "workPackages": [],
        "tasks": [
            { "id": "t-1", "name": "Zero", "duration": 0, "dependencies": [], "workPackageId": "wp-1" }
        ]
    }"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(document.as_bytes()).unwrap();

    match load_project_from_json(file.path()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("duration"), "unexpected message: {msg}");
        }
        other => panic!("expected InvalidData, got {other:?}"),
    }
}
