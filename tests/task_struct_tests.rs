use chrono::NaiveDate;
use plan_tool::{Dependency, DependencyType, Task};
use serde_json::json;
use std::str::FromStr;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn dependency_type_parses_case_insensitively() {
    assert_eq!(DependencyType::from_str("FS").unwrap(), DependencyType::FS);
    assert_eq!(DependencyType::from_str(" ss ").unwrap(), DependencyType::SS);
    assert_eq!(DependencyType::from_str("ff").unwrap(), DependencyType::FF);
    assert_eq!(DependencyType::from_str("Sf").unwrap(), DependencyType::SF);
    assert!(DependencyType::from_str("XX").is_err());
}

#[test]
fn dependency_type_round_trips_through_display() {
    for kind in [
        DependencyType::FS,
        DependencyType::SS,
        DependencyType::FF,
        DependencyType::SF,
    ] {
        let rendered = kind.to_string();
        assert_eq!(DependencyType::from_str(&rendered).unwrap(), kind);
    }
}

#[test]
fn task_serialises_with_document_field_names() {
    let task = Task::new("t-1", "Define Scope", 2, "wp-1")
        .with_dependency(Dependency::new("t-0", DependencyType::SS))
        .with_constraint_date(d(2025, 1, 10));

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "t-1",
            "name": "Define Scope",
            "duration": 2,
            "dependencies": [{ "sourceId": "t-0", "type": "SS" }],
            "workPackageId": "wp-1",
            "constraintDate": "2025-01-10"
        })
    );
}

#[test]
fn unconstrained_task_omits_the_constraint_field() {
    let task = Task::new("t-1", "Define Scope", 2, "wp-1");
    let value = serde_json::to_value(&task).unwrap();
    assert!(value.get("constraintDate").is_none());
}

#[test]
fn task_deserialises_without_optional_fields() {
    let value = json!({
        "id": "t-1",
        "name": "Define Scope",
        "duration": 2,
        "workPackageId": "wp-1"
    });
    let task: Task = serde_json::from_value(value).unwrap();
    assert!(task.dependencies.is_empty());
    assert!(task.constraint_date.is_none());
}

#[test]
fn dataframe_row_round_trip() {
    let task = Task::new("t-1", "Define Scope", 2, "wp-1")
        .with_dependency(Dependency::finish_to_start("t-0"))
        .with_dependency(Dependency::new("t-x", DependencyType::FF))
        .with_constraint_date(d(2025, 1, 10));

    let df = task.to_dataframe_row().unwrap();
    assert_eq!(df.height(), 1);

    let restored = Task::from_dataframe_row(&df, 0).unwrap();
    assert_eq!(restored, task);
}

#[test]
fn dataframe_row_round_trip_without_constraint_or_dependencies() {
    let task = Task::new("t-plain", "Plain", 5, "wp-2");

    let df = task.to_dataframe_row().unwrap();
    let restored = Task::from_dataframe_row(&df, 0).unwrap();

    assert_eq!(restored, task);
    assert!(restored.dependencies.is_empty());
    assert!(restored.constraint_date.is_none());
}
