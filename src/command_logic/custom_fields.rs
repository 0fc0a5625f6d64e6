use std::collections::HashSet;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::Message;
use crate::custom_fields::{custom_fields_list, custom_fields_list_config, filter_documents};
use crate::document_list::DocumentList;
use crate::external_api::paperless_api::models::custom_field::{
    CustomField, CustomFieldDataType, ExtraData, SelectOption,
};
use crate::external_api::paperless_api::models::matching_model::MatchingModel;
use crate::external_api::paperless_api::{ListParams, PaperlessApi};
use crate::external_api::ApiError;
use crate::management_list::{
    ConfirmDialog, EditDialog, EditMode, ManagementList, ManagementListConfig, Notifier, UserPermissions,
};

/// Edit dialog filled from command line arguments
#[derive(Debug, Default, Clone)]
pub struct FieldArgsDialog {
    pub name: Option<String>,
    pub data_type: Option<CustomFieldDataType>,
    pub select_options: Vec<String>,
    pub default_currency: Option<String>,
}

impl FieldArgsDialog {
    /// Existing options keep their ids when the label is entered again.
    /// A label given twice becomes one option.
    fn merge_select_options(&self, existing: Option<&ExtraData>) -> Vec<SelectOption> {
        let existing_options = existing
            .and_then(|extra_data| extra_data.select_options.as_deref())
            .unwrap_or_default();
        let mut seen = HashSet::new();
        self.select_options
            .iter()
            .filter(|label| seen.insert(label.as_str()))
            .map(|label| {
                existing_options
                    .iter()
                    .find(|option| &option.label == label)
                    .cloned()
                    .unwrap_or_else(|| SelectOption::new(label))
            })
            .collect()
    }

    fn extra_data(&self, existing: Option<&ExtraData>) -> Option<ExtraData> {
        let mut extra_data = existing.cloned().unwrap_or_default();
        if !self.select_options.is_empty() {
            extra_data.select_options = Some(self.merge_select_options(existing));
        }
        if let Some(currency) = &self.default_currency {
            extra_data.default_currency = Some(currency.to_uppercase());
        }
        if extra_data.is_empty() {
            None
        } else {
            Some(extra_data)
        }
    }

    fn has_changes(&self) -> bool {
        self.name.is_some() || !self.select_options.is_empty() || self.default_currency.is_some()
    }
}

impl EditDialog<CustomField> for FieldArgsDialog {
    fn open(&mut self, mode: EditMode, object: Option<&CustomField>) -> Result<Option<CustomField>, ApiError> {
        let field = match (mode, object) {
            (EditMode::Create, _) => {
                let name = self.name.as_deref().ok_or_else(|| ApiError::Validation("name is required".to_string()))?;
                let data_type = self
                    .data_type
                    .ok_or_else(|| ApiError::Validation("data type is required".to_string()))?;
                CustomField::new(name, data_type, self.extra_data(None))
            }
            (EditMode::Edit, Some(existing)) => {
                if !self.has_changes() {
                    return Ok(None);
                }
                // the data type can't be changed once the field exists
                CustomField {
                    name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
                    extra_data: self.extra_data(existing.extra_data.as_ref()),
                    ..existing.clone()
                }
            }
            (EditMode::Edit, None) => {
                return Err(ApiError::Validation("nothing to edit".to_string()));
            }
        };
        field.validate()?;
        Ok(Some(field))
    }
}

/// Permission codenames are only fetched for screens that use them
async fn load_permissions<T>(api: &PaperlessApi, config: &ManagementListConfig<T>) -> Result<UserPermissions, ApiError> {
    if config.permissions_disabled {
        return Ok(UserPermissions::default());
    }
    UserPermissions::fetch(api).await
}

/// Plain text table: id, name and every extra column
pub fn render_table<T>(list: &ManagementList<'_, T>) -> String
where
    T: MatchingModel + Serialize + DeserializeOwned,
{
    let rows = list.rows();
    if rows.is_empty() {
        return Message::NoFieldsFound.to_formatted_string();
    }
    let mut header = vec!["ID".to_string(), "Name".to_string()];
    header.extend(list.config().extra_columns.iter().map(|column| column.name.to_string()));
    let mut lines: Vec<Vec<String>> = vec![header];
    lines.extend(rows.into_iter().map(|row| {
        let mut line = vec![row.id.map_or_else(String::new, |id| id.to_string()), row.name];
        line.extend(row.extra);
        line
    }));

    let column_count = lines[0].len();
    let widths: Vec<usize> = (0..column_count)
        .map(|column| lines.iter().map(|line| line[column].chars().count()).max().unwrap_or(0))
        .collect();

    let mut table: Vec<String> = lines
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect();
    table.push(Message::FieldsPage(list.page(), list.page_count(), list.collection_size()).to_formatted_string());
    table.join("\n")
}

pub fn render_field(field: &CustomField) -> String {
    let mut lines = vec![
        format!("ID: {}", field.id.map_or_else(|| "-".to_string(), |id| id.to_string())),
        format!("Name: {}", field.name),
        format!("Data Type: {}", field.data_type.label()),
    ];
    if let Some(created) = field.created {
        lines.push(format!("Created: {}", created.format("%d/%m/%Y %H:%M")));
    }
    if let Some(count) = field.document_count {
        lines.push(format!("Documents: {count}"));
    }
    if let Some(extra_data) = &field.extra_data {
        if let Some(options) = &extra_data.select_options {
            let labels = options.iter().map(|option| option.label.as_str()).collect::<Vec<_>>().join(", ");
            lines.push(format!("Select options: {labels}"));
        }
        if let Some(currency) = &extra_data.default_currency {
            lines.push(format!("Default currency: {currency}"));
        }
    }
    lines.join("\n")
}

async fn get_custom_field(api: &PaperlessApi, id: u32) -> Result<CustomField, ApiError> {
    api.custom_fields().get(id).await.map_err(|e| match e {
        ApiError::Api(StatusCode::NOT_FOUND, _) => ApiError::CouldNotFindCustomFieldById(id),
        other => other,
    })
}

/// One page of custom fields as a table
pub async fn list_custom_fields(
    api: &PaperlessApi,
    notifier: &dyn Notifier,
    params: ListParams,
) -> Result<String, ApiError> {
    let permissions = load_permissions(api, &custom_fields_list_config()).await?;
    let mut list = custom_fields_list(api, &permissions, notifier).with_params(params);
    if !list.user_can_view() {
        return Err(ApiError::PermissionDenied("view".to_string(), list.config().type_name.to_string()));
    }
    list.reload_data().await?;
    Ok(render_table(&list))
}

pub async fn show_custom_field(api: &PaperlessApi, id: u32) -> Result<String, ApiError> {
    Ok(render_field(&get_custom_field(api, id).await?))
}

pub async fn create_custom_field<D: EditDialog<CustomField>>(
    api: &PaperlessApi,
    notifier: &dyn Notifier,
    dialog: &mut D,
) -> Result<String, ApiError> {
    let permissions = load_permissions(api, &custom_fields_list_config()).await?;
    let mut list = custom_fields_list(api, &permissions, notifier);
    match list.open_create_dialog(dialog).await? {
        Some(created) => Ok(render_field(&created)),
        None => Ok(String::new()),
    }
}

pub async fn edit_custom_field<D: EditDialog<CustomField>>(
    api: &PaperlessApi,
    notifier: &dyn Notifier,
    id: u32,
    dialog: &mut D,
) -> Result<String, ApiError> {
    let field = get_custom_field(api, id).await?;
    let permissions = load_permissions(api, &custom_fields_list_config()).await?;
    let mut list = custom_fields_list(api, &permissions, notifier);
    match list.open_edit_dialog(&field, dialog).await? {
        Some(updated) => Ok(render_field(&updated)),
        None => Ok(render_field(&field)),
    }
}

/// Deletes after confirmation and shows the first page of what is left
pub async fn delete_custom_field<C: ConfirmDialog>(
    api: &PaperlessApi,
    notifier: &dyn Notifier,
    id: u32,
    page_size: u32,
    confirm: &mut C,
) -> Result<String, ApiError> {
    let field = get_custom_field(api, id).await?;
    let permissions = load_permissions(api, &custom_fields_list_config()).await?;
    let mut list = custom_fields_list(api, &permissions, notifier).with_params(ListParams::page(1, page_size));
    if !list.open_delete_dialog(&field, confirm).await? {
        return Err(ApiError::DeleteCancelledByUser);
    }
    Ok(render_table(&list))
}

/// Documents that have the field set
pub async fn documents_with_custom_field(api: &PaperlessApi, id: u32, page_size: u32) -> Result<String, ApiError> {
    let field = get_custom_field(api, id).await?;
    let rule = filter_documents(&field)?;
    let mut document_list = DocumentList::new(api, page_size);
    let mut lines: Vec<String> = document_list
        .quick_filter(vec![rule])
        .await?
        .iter()
        .map(|document| format!("{}  {}", document.id, document.title))
        .collect();
    lines.push(Message::DocumentsWithField(field.name, document_list.count()).to_formatted_string());
    Ok(lines.join("\n"))
}
