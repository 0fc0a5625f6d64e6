pub mod custom_field;
pub mod custom_field_query;
pub mod document;
pub mod filter_rule;
pub mod matching_model;
pub mod results;
pub mod ui_settings;
