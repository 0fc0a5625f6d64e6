use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Results<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    /// Ids of every object matching the query, across all pages
    #[serde(default)]
    pub all: Option<Vec<u32>>,
    pub results: Vec<T>,
}
