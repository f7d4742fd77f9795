pub mod aggregation;
pub mod channel_rules;
pub mod prompts;
pub mod response_parser;
pub mod score_parser;
