pub mod plan_dag;

pub use plan_dag::PlanDag;
