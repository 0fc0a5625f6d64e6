//! Custom fields list screen: the generic management list plus the
//! data type column, the delete prompt and the "show documents" action.

use serde_json::json;

use crate::external_api::paperless_api::models::custom_field::CustomField;
use crate::external_api::paperless_api::models::custom_field_query::{CustomFieldQuery, FieldRef, QueryOperator};
use crate::external_api::paperless_api::models::filter_rule::{FilterRule, FILTER_CUSTOM_FIELDS_QUERY};
use crate::external_api::paperless_api::PaperlessApi;
use crate::external_api::ApiError;
use crate::management_list::{ExtraColumn, ManagementList, ManagementListConfig, Notifier, PermissionsService};

pub type CustomFieldsList<'a> = ManagementList<'a, CustomField>;

pub fn data_type_label(field: &CustomField) -> String {
    field.data_type.label().to_string()
}

pub fn delete_message(field: &CustomField) -> String {
    format!("Do you really want to delete the field \"{}\"?", field.name)
}

pub fn custom_fields_list_config() -> ManagementListConfig<CustomField> {
    ManagementListConfig {
        type_name: "custom field",
        type_name_plural: "custom fields",
        permission_resource: "customfield",
        extra_columns: vec![ExtraColumn {
            key: "data_type",
            name: "Data Type",
            value_fn: data_type_label,
        }],
        delete_message: Some(delete_message),
        // custom fields are not permission-scoped
        permissions_disabled: true,
    }
}

pub fn custom_fields_list<'a>(
    api: &'a PaperlessApi,
    permissions: &'a dyn PermissionsService,
    notifier: &'a dyn Notifier,
) -> CustomFieldsList<'a> {
    ManagementList::new(api.custom_fields(), custom_fields_list_config(), permissions, notifier)
}

/// Filter rule matching every document that has `field` set
pub fn filter_documents(field: &CustomField) -> Result<FilterRule, ApiError> {
    let id = field.id.ok_or_else(|| ApiError::NotSaved(field.name.clone()))?;
    let query = CustomFieldQuery::any_of(vec![CustomFieldQuery::atom(
        FieldRef::Id(id),
        QueryOperator::Exists,
        json!(true),
    )]);
    Ok(FilterRule {
        rule_type: FILTER_CUSTOM_FIELDS_QUERY,
        value: serde_json::to_string(&query)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_api::paperless_api::models::custom_field::{CustomFieldDataType, ExtraData, SelectOption};
    use crate::management_list::test_support::{DenyAll, RecordingNotifier, ScriptedConfirm};
    use mockito::{Matcher, Server};
    use rstest::rstest;

    fn field(id: u32, name: &str, data_type: CustomFieldDataType) -> CustomField {
        CustomField { id: Some(id), ..CustomField::new(name, data_type, None) }
    }

    #[test]
    fn test_data_type_column() {
        let config = custom_fields_list_config();
        assert_eq!(config.extra_columns.len(), 1);
        assert_eq!(config.extra_columns[0].key, "data_type");
        assert_eq!(config.extra_columns[0].name, "Data Type");
        for data_type in CustomFieldDataType::ALL {
            let value = (config.extra_columns[0].value_fn)(&field(1, "x", data_type));
            assert!(!value.is_empty());
        }
        assert_eq!((config.extra_columns[0].value_fn)(&field(1, "x", CustomFieldDataType::Unknown)), "Unknown");
    }

    #[test]
    fn test_permissions_disabled() {
        let config = custom_fields_list_config();
        assert!(config.permissions_disabled);
        let api = PaperlessApi::mock("http://paperless.local");
        let notifier = RecordingNotifier::default();
        let list = custom_fields_list(&api, &DenyAll, &notifier);
        assert!(list.user_can_view());
        assert!(list.user_can_add());
        assert!(list.user_can_edit());
        assert!(list.user_can_delete());
    }

    #[rstest]
    #[case("Invoice #", "Do you really want to delete the field \"Invoice #\"?")]
    #[case("say \"hi\"", "Do you really want to delete the field \"say \"hi\"\"?")]
    #[case("Fälligkeit 📅", "Do you really want to delete the field \"Fälligkeit 📅\"?")]
    #[case("", "Do you really want to delete the field \"\"?")]
    fn test_delete_message(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(delete_message(&field(1, name, CustomFieldDataType::String)), expected);
    }

    #[rstest]
    #[case(7)]
    #[case(1)]
    #[case(u32::MAX)]
    fn test_filter_documents(#[case] id: u32) {
        let rule = filter_documents(&field(id, "any", CustomFieldDataType::Integer)).unwrap();
        assert_eq!(rule.rule_type, FILTER_CUSTOM_FIELDS_QUERY);
        let value: serde_json::Value = serde_json::from_str(&rule.value).unwrap();
        assert_eq!(value, json!(["or", [[id, "exists", true]]]));
    }

    #[test]
    fn test_filter_documents_unsaved_field() {
        let draft = CustomField::new("Draft", CustomFieldDataType::String, None);
        assert!(matches!(filter_documents(&draft), Err(ApiError::NotSaved(name)) if name == "Draft"));
    }

    #[test]
    fn test_filter_documents_does_not_touch_extra_data() {
        let extra_data = ExtraData {
            select_options: Some(vec![SelectOption { label: "A".into(), id: "a".into() }]),
            default_currency: None,
        };
        let select = CustomField { id: Some(3), ..CustomField::new("Status", CustomFieldDataType::Select, Some(extra_data.clone())) };
        let before = select.clone();
        filter_documents(&select).unwrap();
        assert_eq!(select, before);
        assert_eq!(select.extra_data, Some(extra_data));
    }

    #[tokio::test]
    async fn test_invoice_field_scenario() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/api/custom_fields/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"count": 1, "next": null, "previous": null,
                "results": [{"id": 7, "name": "Invoice #", "data_type": "monetary"}]}"#)
            .create_async()
            .await;
        let delete = server.mock("DELETE", "/api/custom_fields/7/").with_status(204).create_async().await;
        let api = PaperlessApi::mock(&server.url());
        let notifier = RecordingNotifier::default();
        let mut list = custom_fields_list(&api, &DenyAll, &notifier);

        list.reload_data().await.unwrap();
        let rows = list.rows();
        assert_eq!(rows[0].name, "Invoice #");
        assert_eq!(rows[0].extra, vec!["Monetary".to_string()]);

        let invoice = list.collection()[0].clone();
        let rule = filter_documents(&invoice).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&rule.value).unwrap(), json!(["or", [[7, "exists", true]]]));

        let mut confirm = ScriptedConfirm::new(true);
        assert!(list.open_delete_dialog(&invoice, &mut confirm).await.unwrap());
        assert_eq!(confirm.messages, vec!["Do you really want to delete the field \"Invoice #\"?".to_string()]);
        delete.assert_async().await;
    }
}
