pub mod brand_compliance;
pub mod channel_compliance;
pub mod comprehensive_analysis;
pub mod content_analysis;
pub mod llm_runner;
pub mod message_intent;
pub mod plan_ledger;
