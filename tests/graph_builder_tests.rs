use plan_tool::graph::PlanDag;
use plan_tool::{Dependency, DependencyType, Task};

fn task(id: &str, duration: i64) -> Task {
    Task::new(id, format!("Task {id}"), duration, "wp-1")
}

#[test]
fn builds_one_node_per_task_and_one_edge_per_resolved_dependency() {
    let tasks = vec![
        task("a", 2),
        task("b", 3)
            .with_dependency(Dependency::finish_to_start("a"))
            .with_dependency(Dependency::new("ghost", DependencyType::SS)),
        task("c", 1).with_dependency(Dependency::new("a", DependencyType::FF)),
    ];
    let dag = PlanDag::build(&tasks);

    assert_eq!(dag.graph.node_count(), 3);
    // The dangling "ghost" source contributes no edge.
    assert_eq!(dag.graph.edge_count(), 2);
    assert!(dag.id_to_index.contains_key("a"));
    assert!(!dag.id_to_index.contains_key("ghost"));
}

#[test]
fn topo_order_respects_precedence_in_a_diamond() {
    let tasks = vec![
        task("d", 1)
            .with_dependency(Dependency::finish_to_start("b"))
            .with_dependency(Dependency::finish_to_start("c")),
        task("b", 5).with_dependency(Dependency::finish_to_start("a")),
        task("c", 1).with_dependency(Dependency::finish_to_start("a")),
        task("a", 2),
    ];
    let dag = PlanDag::build(&tasks);
    let order = dag.topo_order().expect("diamond is acyclic");

    let position = |id: &str| {
        let idx = tasks.iter().position(|t| t.id == id).unwrap();
        order.iter().position(|&o| o == idx).unwrap()
    };
    assert!(position("a") < position("b"));
    assert!(position("a") < position("c"));
    assert!(position("b") < position("d"));
    assert!(position("c") < position("d"));
}

#[test]
fn cyclic_graph_reports_cycle() {
    let tasks = vec![
        task("a", 2).with_dependency(Dependency::finish_to_start("b")),
        task("b", 3).with_dependency(Dependency::finish_to_start("a")),
    ];
    let dag = PlanDag::build(&tasks);

    assert!(dag.is_cyclic());
    assert!(dag.topo_order().is_none());
}

#[test]
fn disconnected_tasks_all_appear_in_order() {
    let tasks = vec![task("x", 1), task("y", 2), task("z", 3)];
    let dag = PlanDag::build(&tasks);
    let mut order = dag.topo_order().unwrap();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2]);
}
