use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::matching_model::MatchingModel;
use crate::external_api::ApiError;

/// Wire values are lowercase and must match the server verbatim
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldDataType {
    String,
    Url,
    Date,
    Boolean,
    Integer,
    Float,
    Monetary,
    #[serde(rename = "documentlink")]
    DocumentLink,
    Select,
    /// Any value this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl CustomFieldDataType {
    pub const ALL: [CustomFieldDataType; 9] = [
        CustomFieldDataType::String,
        CustomFieldDataType::Url,
        CustomFieldDataType::Date,
        CustomFieldDataType::Boolean,
        CustomFieldDataType::Integer,
        CustomFieldDataType::Float,
        CustomFieldDataType::Monetary,
        CustomFieldDataType::DocumentLink,
        CustomFieldDataType::Select,
    ];

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            CustomFieldDataType::String => "Text",
            CustomFieldDataType::Url => "URL",
            CustomFieldDataType::Date => "Date",
            CustomFieldDataType::Boolean => "Boolean",
            CustomFieldDataType::Integer => "Integer",
            CustomFieldDataType::Float => "Float",
            CustomFieldDataType::Monetary => "Monetary",
            CustomFieldDataType::DocumentLink => "Document Link",
            CustomFieldDataType::Select => "Select",
            CustomFieldDataType::Unknown => "Unknown",
        }
    }

    /// Parse the wire value, e.g. from a command line argument
    pub fn from_wire(value: &str) -> Result<Self, ApiError> {
        Self::ALL
            .iter()
            .copied()
            .find(|data_type| data_type.wire_value() == value)
            .ok_or_else(|| ApiError::Validation(format!("Unknown data type '{value}'")))
    }

    pub fn wire_value(&self) -> &'static str {
        match self {
            CustomFieldDataType::String => "string",
            CustomFieldDataType::Url => "url",
            CustomFieldDataType::Date => "date",
            CustomFieldDataType::Boolean => "boolean",
            CustomFieldDataType::Integer => "integer",
            CustomFieldDataType::Float => "float",
            CustomFieldDataType::Monetary => "monetary",
            CustomFieldDataType::DocumentLink => "documentlink",
            CustomFieldDataType::Select => "select",
            CustomFieldDataType::Unknown => "unknown",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub id: String,
}

impl SelectOption {
    /// New option with a freshly generated id
    pub fn new(label: &str) -> Self {
        Self { label: label.to_string(), id: uuid::Uuid::new_v4().simple().to_string() }
    }
}

/// Configuration whose valid shape depends on the data type.
/// `select_options` belongs to select fields, `default_currency` to monetary ones.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
}

impl ExtraData {
    pub fn is_empty(&self) -> bool {
        self.select_options.as_ref().map_or(true, |options| options.is_empty()) && self.default_currency.is_none()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CustomField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: String,
    pub data_type: CustomFieldDataType,
    #[serde(default, skip_serializing)]
    pub created: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<ExtraData>,
    #[serde(default, skip_serializing)]
    pub document_count: Option<u64>,
}

impl CustomField {
    pub fn new(name: &str, data_type: CustomFieldDataType, extra_data: Option<ExtraData>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            data_type,
            created: None,
            extra_data,
            document_count: None,
        }
    }

    /// Checks that `extra_data` matches `data_type` before it is sent to the server
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        if self.data_type == CustomFieldDataType::Unknown {
            return Err(ApiError::Validation("data type is unknown".to_string()));
        }
        let Some(extra_data) = &self.extra_data else {
            return Ok(());
        };
        // the server sends an empty option list for every data type
        if let Some(options) = extra_data.select_options.as_ref().filter(|options| !options.is_empty()) {
            if self.data_type != CustomFieldDataType::Select {
                return Err(ApiError::Validation(format!(
                    "select options are only allowed for select fields, not {}",
                    self.data_type.wire_value()
                )));
            }
            if options.iter().any(|option| option.label.trim().is_empty()) {
                return Err(ApiError::Validation("select option labels must not be empty".to_string()));
            }
        }
        if let Some(currency) = &extra_data.default_currency {
            if self.data_type != CustomFieldDataType::Monetary {
                return Err(ApiError::Validation(format!(
                    "default currency is only allowed for monetary fields, not {}",
                    self.data_type.wire_value()
                )));
            }
            let regex = Regex::new(r"^[A-Z]{3}$").map_err(|e| ApiError::Validation(e.to_string()))?;
            if !regex.is_match(currency) {
                return Err(ApiError::Validation(format!(
                    "default currency must be a 3-letter ISO 4217 code, got '{currency}'"
                )));
            }
        }
        Ok(())
    }
}

impl MatchingModel for CustomField {
    fn id(&self) -> Option<u32> {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
