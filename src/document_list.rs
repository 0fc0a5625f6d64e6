use log::debug;

use crate::external_api::paperless_api::models::custom_field_query::CustomFieldQuery;
use crate::external_api::paperless_api::models::document::Document;
use crate::external_api::paperless_api::models::filter_rule::{FilterRule, FILTER_CUSTOM_FIELDS_QUERY};
use crate::external_api::paperless_api::{ListParams, PaperlessApi};
use crate::external_api::ApiError;

/// Document list that can be re-queried with a set of filter rules
pub struct DocumentList<'a> {
    api: &'a PaperlessApi,
    page_size: u32,
    filter_rules: Vec<FilterRule>,
    documents: Vec<Document>,
    count: u64,
}

impl<'a> DocumentList<'a> {
    pub fn new(api: &'a PaperlessApi, page_size: u32) -> Self {
        Self { api, page_size, filter_rules: Vec::new(), documents: Vec::new(), count: 0 }
    }

    pub fn filter_rules(&self) -> &[FilterRule] {
        &self.filter_rules
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Total number of matching documents, not only the loaded page
    pub fn count(&self) -> u64 {
        self.count
    }

    fn rule_to_query(rule: &FilterRule) -> Result<(String, String), ApiError> {
        match rule.rule_type {
            FILTER_CUSTOM_FIELDS_QUERY => {
                // reject malformed queries before the server does
                serde_json::from_str::<CustomFieldQuery>(&rule.value)?;
                Ok(("custom_field_query".to_string(), rule.value.clone()))
            }
            other => Err(ApiError::UnsupportedFilterRule(other)),
        }
    }

    /// Replaces the current filter with `rules` and loads the first page
    pub async fn quick_filter(&mut self, rules: Vec<FilterRule>) -> Result<&[Document], ApiError> {
        let filters = rules.iter().map(Self::rule_to_query).collect::<Result<Vec<_>, _>>()?;
        debug!("Quick filter with {} rule(s)", rules.len());
        let params = ListParams {
            page: Some(1),
            page_size: Some(self.page_size),
            sort_field: Some("created".to_string()),
            sort_reverse: true,
            name_filter: None,
        };
        let results = self.api.list_documents(&params, &filters).await?;
        self.filter_rules = rules;
        self.documents = results.results;
        self.count = results.count;
        Ok(&self.documents)
    }
}
