pub mod analyses;
pub mod brand_compliance;
pub mod compliance;
pub mod enums;
pub mod guidelines;
pub mod media;
pub mod message_intent;
pub mod plan_selections;
pub mod plans;
pub mod purchase_intent;
