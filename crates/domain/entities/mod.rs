pub mod analyses;
pub mod plan_selections;
