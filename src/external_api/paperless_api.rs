pub mod models;

use std::marker::PhantomData;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, BaseApiClient};
use models::custom_field::CustomField;
use models::document::Document;
use models::matching_model::MatchingModel;
use models::results::Results;
use models::ui_settings::UiSettings;

const LIST_ALL_PAGE_SIZE: u32 = 100;
const LIST_ALL_LIMIT_PAGES: u32 = 50;

/// Pagination, sorting and name filter of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_reverse: bool,
    /// Case-insensitive substring of the name
    pub name_filter: Option<String>,
}

impl ListParams {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self { page: Some(page), page_size: Some(page_size), ..Default::default() }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size".to_string(), page_size.to_string()));
        }
        if let Some(sort_field) = &self.sort_field {
            let prefix = if self.sort_reverse { "-" } else { "" };
            query.push(("ordering".to_string(), format!("{prefix}{sort_field}")));
        }
        if let Some(name) = self.name_filter.as_deref().filter(|name| !name.is_empty()) {
            query.push(("name__icontains".to_string(), name.to_string()));
        }
        query
    }
}

/// Generic CRUD client over one collection resource whose entities have a name
pub struct NameFilterClient<'a, T> {
    client: &'a BaseApiClient,
    resource_url: String,
    entity: PhantomData<T>,
}

impl<'a, T> NameFilterClient<'a, T>
where
    T: MatchingModel + Serialize + DeserializeOwned,
{
    pub fn new(client: &'a BaseApiClient, api_prefix: &str, resource: &str) -> Self {
        Self { client, resource_url: format!("{api_prefix}/{resource}/"), entity: PhantomData }
    }

    fn entity_url(&self, id: u32) -> String {
        format!("{}{}/", self.resource_url, id)
    }

    fn saved_id(entity: &T) -> Result<u32, ApiError> {
        entity.id().ok_or_else(|| ApiError::NotSaved(entity.name().to_string()))
    }

    pub async fn list(&self, params: &ListParams) -> Result<Results<T>, ApiError> {
        self.client.get(&self.resource_url, &params.to_query()).await
    }

    /// Walks every page until the server reports no next page,
    /// but never more than `LIST_ALL_LIMIT_PAGES` pages
    pub async fn list_all(&self) -> Result<Vec<T>, ApiError> {
        let mut current_page: u32 = 1;
        let mut entities: Vec<T> = Vec::new();
        loop {
            let response = self.list(&ListParams::page(current_page, LIST_ALL_PAGE_SIZE)).await?;
            entities.extend(response.results);
            if response.next.is_none() {
                break;
            }
            if current_page >= LIST_ALL_LIMIT_PAGES {
                warn!(
                    "Stopped listing {} after {} pages, {} of {} loaded",
                    self.resource_url,
                    LIST_ALL_LIMIT_PAGES,
                    entities.len(),
                    response.count
                );
                break;
            }
            current_page += 1;
        }
        Ok(entities)
    }

    pub async fn get_few(&self, ids: &[u32]) -> Result<Results<T>, ApiError> {
        let ids = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
        let query = vec![
            ("id__in".to_string(), ids),
            ("page_size".to_string(), LIST_ALL_PAGE_SIZE.to_string()),
        ];
        self.client.get(&self.resource_url, &query).await
    }

    pub async fn get(&self, id: u32) -> Result<T, ApiError> {
        self.client.get(&self.entity_url(id), &[]).await
    }

    pub async fn create(&self, entity: &T) -> Result<T, ApiError> {
        self.client.post(&self.resource_url, entity).await
    }

    pub async fn update(&self, entity: &T) -> Result<T, ApiError> {
        let id = Self::saved_id(entity)?;
        self.client.put(&self.entity_url(id), entity).await
    }

    pub async fn delete(&self, id: u32) -> Result<(), ApiError> {
        self.client.delete(&self.entity_url(id)).await
    }
}

pub struct PaperlessApi {
    pub client: BaseApiClient,
    api_prefix: String,
}

impl PaperlessApi {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ApiError> {
        let base_api_client = BaseApiClient::new(base_url, api_key)?;
        Ok(Self { client: base_api_client, api_prefix: "api".to_string() })
    }

    #[cfg(test)]
    pub fn mock(url: &str) -> Self {
        Self::new("test_api_key", url).unwrap()
    }

    pub fn custom_fields(&self) -> NameFilterClient<'_, CustomField> {
        NameFilterClient::new(&self.client, &self.api_prefix, "custom_fields")
    }

    /// One page of documents, `filters` are appended to the query as is
    pub async fn list_documents(
        &self,
        params: &ListParams,
        filters: &[(String, String)],
    ) -> Result<Results<Document>, ApiError> {
        let mut query = params.to_query();
        query.extend_from_slice(filters);
        self.client.get(&format!("{}/documents/", self.api_prefix), &query).await
    }

    pub async fn get_ui_settings(&self) -> Result<UiSettings, ApiError> {
        self.client.get(&format!("{}/ui_settings/", self.api_prefix), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::custom_field::{CustomFieldDataType, ExtraData, SelectOption};
    use mockito::{Matcher, Server};
    use rstest::rstest;

    const FIELD_JSON: &str = r#"{"id": 7, "name": "Invoice #", "data_type": "monetary",
        "extra_data": {"default_currency": "EUR"}, "document_count": 2}"#;

    fn page_json(count: u64, next: Option<&str>, results: &[&str]) -> String {
        let next = next.map_or("null".to_string(), |url| format!("\"{url}\""));
        format!(r#"{{"count": {count}, "next": {next}, "previous": null, "results": [{}]}}"#, results.join(","))
    }

    #[test]
    fn test_field_api_prefix() {
        let api = PaperlessApi::mock("http://paperless.local");
        assert_eq!(api.api_prefix, "api");
        assert_eq!(api.custom_fields().resource_url, "api/custom_fields/");
        assert_eq!(api.custom_fields().entity_url(3), "api/custom_fields/3/");
    }

    #[rstest]
    #[case(ListParams::default(), vec![])]
    #[case(ListParams::page(2, 25), vec![("page", "2"), ("page_size", "25")])]
    #[case(
        ListParams { sort_field: Some("name".into()), sort_reverse: true, ..Default::default() },
        vec![("ordering", "-name")]
    )]
    #[case(
        ListParams { sort_field: Some("data_type".into()), name_filter: Some("inv".into()), ..Default::default() },
        vec![("ordering", "data_type"), ("name__icontains", "inv")]
    )]
    #[case(ListParams { name_filter: Some(String::new()), ..Default::default() }, vec![])]
    fn test_list_params_to_query(#[case] params: ListParams, #[case] expected: Vec<(&str, &str)>) {
        let expected: Vec<(String, String)> =
            expected.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        assert_eq!(params.to_query(), expected);
    }

    #[tokio::test]
    async fn test_list_with_name_filter() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("page_size".into(), "25".into()),
                Matcher::UrlEncoded("ordering".into(), "-name".into()),
                Matcher::UrlEncoded("name__icontains".into(), "inv".into()),
            ]))
            .with_status(200)
            .with_body(page_json(1, None, &[FIELD_JSON]))
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let params = ListParams {
            page: Some(1),
            page_size: Some(25),
            sort_field: Some("name".into()),
            sort_reverse: true,
            name_filter: Some("inv".into()),
        };
        let page = api.custom_fields().list(&params).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].name, "Invoice #");
        assert_eq!(page.results[0].data_type, CustomFieldDataType::Monetary);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_propagates_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"detail": "You do not have permission"}"#)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let result = api.custom_fields().list(&ListParams::default()).await;
        assert!(matches!(result, Err(ApiError::Api(status, body)) if status == 403 && body.contains("permission")));
    }

    #[tokio::test]
    async fn test_list_all_walks_pages() {
        let mut server = Server::new_async().await;
        let first_page = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(page_json(2, Some("http://x/api/custom_fields/?page=2"), &[FIELD_JSON]))
            .create_async()
            .await;
        let second_page = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(page_json(2, None, &[r#"{"id": 8, "name": "Due", "data_type": "date"}"#]))
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let fields = api.custom_fields().list_all().await.unwrap();
        assert_eq!(fields.iter().map(|f| f.id.unwrap()).collect::<Vec<_>>(), vec![7, 8]);
        first_page.assert_async().await;
        second_page.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_all_stops_at_page_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(page_json(10_000, Some("http://x/api/custom_fields/?page=next"), &[FIELD_JSON]))
            .expect(LIST_ALL_LIMIT_PAGES as usize)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let fields = api.custom_fields().list_all().await.unwrap();
        assert_eq!(fields.len(), LIST_ALL_LIMIT_PAGES as usize);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_custom_fields_under_sub_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paperless/api/custom_fields/7/")
            .with_status(200)
            .with_body(FIELD_JSON)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&format!("{}/paperless", server.url()));
        let field = api.custom_fields().get(7).await.unwrap();
        assert_eq!(field.name, "Invoice #");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_few() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::UrlEncoded("id__in".into(), "7,8".into()))
            .with_status(200)
            .with_body(page_json(1, None, &[FIELD_JSON]))
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let page = api.custom_fields().get_few(&[7, 8]).await.unwrap();
        assert_eq!(page.results.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/custom_fields/7/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(FIELD_JSON)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let field = api.custom_fields().get(7).await.unwrap();
        assert_eq!(field.id, Some(7));
        assert_eq!(field.document_count, Some(2));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_and_update_keep_select_options() {
        let mut server = Server::new_async().await;
        let options = serde_json::json!([{"label": "A", "id": "a"}]);
        let create_mock = server
            .mock("POST", "/api/custom_fields/")
            .match_body(Matcher::Json(serde_json::json!({
                "name": "Status", "data_type": "select", "extra_data": {"select_options": options}
            })))
            .with_status(201)
            .with_body(r#"{"id": 11, "name": "Status", "data_type": "select",
                "extra_data": {"select_options": [{"label": "A", "id": "a"}], "default_currency": null}}"#)
            .create_async()
            .await;
        let update_mock = server
            .mock("PUT", "/api/custom_fields/11/")
            .match_body(Matcher::Json(serde_json::json!({
                "id": 11, "name": "State", "data_type": "select", "extra_data": {"select_options": options}
            })))
            .with_status(200)
            .with_body(r#"{"id": 11, "name": "State", "data_type": "select",
                "extra_data": {"select_options": [{"label": "A", "id": "a"}]}}"#)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let extra_data = ExtraData {
            select_options: Some(vec![SelectOption { label: "A".into(), id: "a".into() }]),
            default_currency: None,
        };
        let field = CustomField::new("Status", CustomFieldDataType::Select, Some(extra_data.clone()));
        let mut created = api.custom_fields().create(&field).await.unwrap();
        assert_eq!(created.extra_data.as_ref(), Some(&extra_data));

        created.name = "State".to_string();
        let updated = api.custom_fields().update(&created).await.unwrap();
        assert_eq!(updated.extra_data, Some(extra_data));
        create_mock.assert_async().await;
        update_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_unsaved_entity() {
        let api = PaperlessApi::mock("http://paperless.local");
        let field = CustomField::new("Draft", CustomFieldDataType::String, None);
        let result = api.custom_fields().update(&field).await;
        assert!(matches!(result, Err(ApiError::NotSaved(name)) if name == "Draft"));
    }

    #[tokio::test]
    async fn test_delete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/custom_fields/7/")
            .with_status(204)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        assert!(api.custom_fields().delete(7).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_documents_with_filters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/documents/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("custom_field_query".into(), r#"["or",[[7,"exists",true]]]"#.into()),
            ]))
            .with_status(200)
            .with_body(page_json(1, None, &[r#"{"id": 1, "title": "Scan"}"#]))
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let filters = vec![("custom_field_query".to_string(), r#"["or",[[7,"exists",true]]]"#.to_string())];
        let page = api
            .list_documents(&ListParams { page: Some(1), ..Default::default() }, &filters)
            .await
            .unwrap();
        assert_eq!(page.results[0].title, "Scan");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_ui_settings() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/ui_settings/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"user": {"id": 1}, "settings": {}, "permissions": ["view_customfield", "add_tag"]}"#)
            .create_async()
            .await;

        let api = PaperlessApi::mock(&server.url());
        let settings = api.get_ui_settings().await.unwrap();
        assert_eq!(settings.permissions, vec!["view_customfield", "add_tag"]);
    }
}
