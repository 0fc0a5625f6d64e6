//! Custom field query grammar understood by the documents endpoint.
//!
//! The wire form is nested JSON arrays:
//! - atom: `[field, operator, value]`, where field is an id or a name
//! - expression: `["and" | "or", [query, ...]]`
//! - negation: `["not", query]`
//!
//! Logical operators are written lowercase and read in any case.

use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
    #[serde(alias = "NOT")]
    Not,
}

impl LogicalOperator {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "and" => Some(LogicalOperator::And),
            "or" => Some(LogicalOperator::Or),
            "not" => Some(LogicalOperator::Not),
            _ => None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryOperator {
    Exact,
    In,
    IsNull,
    Exists,
    IContains,
    IStartsWith,
    IEndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    Range,
    Contains,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldRef {
    Id(u32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldQuery {
    Atom {
        field: FieldRef,
        operator: QueryOperator,
        value: Value,
    },
    Expression {
        operator: LogicalOperator,
        args: Vec<CustomFieldQuery>,
    },
    Not(Box<CustomFieldQuery>),
}

impl CustomFieldQuery {
    pub fn atom(field: FieldRef, operator: QueryOperator, value: Value) -> Self {
        CustomFieldQuery::Atom { field, operator, value }
    }

    pub fn any_of(args: Vec<CustomFieldQuery>) -> Self {
        CustomFieldQuery::Expression { operator: LogicalOperator::Or, args }
    }

    pub fn all_of(args: Vec<CustomFieldQuery>) -> Self {
        CustomFieldQuery::Expression { operator: LogicalOperator::And, args }
    }

    fn from_value(value: Value) -> Result<Self, String> {
        let Value::Array(mut items) = value else {
            return Err(format!("expected an array, got {value}"));
        };
        match items.len() {
            3 => {
                let value = items.pop().unwrap_or(Value::Null);
                let operator: QueryOperator = serde_json::from_value(items.pop().unwrap_or(Value::Null))
                    .map_err(|e| format!("invalid operator: {e}"))?;
                let field: FieldRef = serde_json::from_value(items.pop().unwrap_or(Value::Null))
                    .map_err(|e| format!("invalid field reference: {e}"))?;
                Ok(CustomFieldQuery::Atom { field, operator, value })
            }
            2 => {
                let operand = items.pop().unwrap_or(Value::Null);
                let operator = items
                    .pop()
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(LogicalOperator::parse)
                    .ok_or_else(|| "expected a logical operator".to_string())?;
                match operator {
                    LogicalOperator::Not => Ok(CustomFieldQuery::Not(Box::new(Self::from_value(operand)?))),
                    _ => {
                        let Value::Array(args) = operand else {
                            return Err("expected a list of queries after the logical operator".to_string());
                        };
                        if args.is_empty() {
                            return Err("a logical expression needs at least one query".to_string());
                        }
                        let args = args
                            .into_iter()
                            .map(Self::from_value)
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(CustomFieldQuery::Expression { operator, args })
                    }
                }
            }
            len => Err(format!("expected 2 or 3 elements, got {len}")),
        }
    }
}

impl Serialize for CustomFieldQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CustomFieldQuery::Atom { field, operator, value } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(field)?;
                seq.serialize_element(operator)?;
                seq.serialize_element(value)?;
                seq.end()
            }
            CustomFieldQuery::Expression { operator, args } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(operator)?;
                seq.serialize_element(args)?;
                seq.end()
            }
            CustomFieldQuery::Not(query) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&LogicalOperator::Not)?;
                seq.serialize_element(query)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CustomFieldQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}
