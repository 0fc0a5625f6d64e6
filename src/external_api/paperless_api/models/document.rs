use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CustomFieldInstance {
    pub field: u32,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Document {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldInstance>,
}
