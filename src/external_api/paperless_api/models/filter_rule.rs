use serde::{Deserialize, Serialize};

/// Rule type of a custom field query filter
pub const FILTER_CUSTOM_FIELDS_QUERY: u32 = 42;

/// A single document list filter. `value` is always a string on the wire,
/// structured values are serialized JSON.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub rule_type: u32,
    pub value: String,
}
