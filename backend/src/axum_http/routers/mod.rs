pub mod analyses;
pub mod plans;
