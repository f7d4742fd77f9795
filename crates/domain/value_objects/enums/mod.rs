pub mod ad_types;
pub mod analysis_kinds;
pub mod answers;
pub mod compliance_levels;
pub mod features;
pub mod funnel_stages;
pub mod guideline_inputs;
pub mod ledger_actions;
pub mod media_kinds;
pub mod payment_statuses;
pub mod plan_tiers;
pub mod platforms;
