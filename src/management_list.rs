//! Reusable list screen over one kind of named entity.
//!
//! A screen is composed from a [`NameFilterClient`] and a
//! [`ManagementListConfig`]; dialogs, notifications and permission checks
//! are supplied by the caller.

use std::collections::HashSet;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::external_api::paperless_api::models::matching_model::MatchingModel;
use crate::external_api::paperless_api::{ListParams, NameFilterClient, PaperlessApi};
use crate::external_api::ApiError;

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    View,
    Add,
    Change,
    Delete,
}

impl PermissionAction {
    pub fn codename(&self) -> &'static str {
        match self {
            PermissionAction::View => "view",
            PermissionAction::Add => "add",
            PermissionAction::Change => "change",
            PermissionAction::Delete => "delete",
        }
    }
}

pub trait PermissionsService {
    fn current_user_can(&self, action: PermissionAction, resource: &str) -> bool;
}

/// Permission codenames granted to the current user, e.g. `change_customfield`
#[derive(Debug, Clone, Default)]
pub struct UserPermissions {
    codenames: HashSet<String>,
}

impl UserPermissions {
    pub fn new<I: IntoIterator<Item = String>>(codenames: I) -> Self {
        Self { codenames: codenames.into_iter().collect() }
    }

    pub async fn fetch(api: &PaperlessApi) -> Result<Self, ApiError> {
        Ok(Self::new(api.get_ui_settings().await?.permissions))
    }
}

impl PermissionsService for UserPermissions {
    fn current_user_can(&self, action: PermissionAction, resource: &str) -> bool {
        self.codenames.contains(&format!("{}_{}", action.codename(), resource))
    }
}

/// Toast-like user feedback
pub trait Notifier {
    fn show_info(&self, message: &str);
    fn show_error(&self, message: &str, error: &ApiError);
}

pub trait ConfirmDialog {
    /// `Ok(false)` when the user declines
    fn confirm(&mut self, title: &str, message: &str) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit,
}

pub trait EditDialog<T> {
    /// Returns the entity to persist, or `None` if the dialog was cancelled
    fn open(&mut self, mode: EditMode, object: Option<&T>) -> Result<Option<T>, ApiError>;
}

/// Additional column shown after the name
pub struct ExtraColumn<T> {
    pub key: &'static str,
    pub name: &'static str,
    pub value_fn: fn(&T) -> String,
}

pub struct ManagementListConfig<T> {
    pub type_name: &'static str,
    pub type_name_plural: &'static str,
    /// Model part of the permission codename, e.g. `customfield`
    pub permission_resource: &'static str,
    pub extra_columns: Vec<ExtraColumn<T>>,
    /// Falls back to a generic message when `None`
    pub delete_message: Option<fn(&T) -> String>,
    /// Actions are always available, whatever the permission service says
    pub permissions_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: Option<u32>,
    pub name: String,
    pub extra: Vec<String>,
}

pub struct ManagementList<'a, T> {
    service: NameFilterClient<'a, T>,
    config: ManagementListConfig<T>,
    permissions: &'a dyn PermissionsService,
    notifier: &'a dyn Notifier,
    page: u32,
    page_size: u32,
    sort_field: Option<String>,
    sort_reverse: bool,
    name_filter: Option<String>,
    collection: Vec<T>,
    collection_size: u64,
}

impl<'a, T> ManagementList<'a, T>
where
    T: MatchingModel + Serialize + DeserializeOwned,
{
    pub fn new(
        service: NameFilterClient<'a, T>,
        config: ManagementListConfig<T>,
        permissions: &'a dyn PermissionsService,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            service,
            config,
            permissions,
            notifier,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: Some("name".to_string()),
            sort_reverse: false,
            name_filter: None,
            collection: Vec::new(),
            collection_size: 0,
        }
    }

    /// Initial paging, sorting and filter state, used by the next reload
    pub fn with_params(mut self, params: ListParams) -> Self {
        self.page = params.page.unwrap_or(1).max(1);
        self.page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        if params.sort_field.is_some() {
            self.sort_field = params.sort_field;
        }
        self.sort_reverse = params.sort_reverse;
        self.name_filter = params.name_filter.filter(|name| !name.is_empty());
        self
    }

    pub fn config(&self) -> &ManagementListConfig<T> {
        &self.config
    }

    pub fn collection(&self) -> &[T] {
        &self.collection
    }

    pub fn collection_size(&self) -> u64 {
        self.collection_size
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_count(&self) -> u64 {
        self.collection_size.div_ceil(u64::from(self.page_size))
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_reverse(&self) -> bool {
        self.sort_reverse
    }

    fn list_params(&self) -> ListParams {
        ListParams {
            page: Some(self.page),
            page_size: Some(self.page_size),
            sort_field: self.sort_field.clone(),
            sort_reverse: self.sort_reverse,
            name_filter: self.name_filter.clone(),
        }
    }

    pub async fn reload_data(&mut self) -> Result<(), ApiError> {
        match self.service.list(&self.list_params()).await {
            Ok(results) => {
                self.collection = results.results;
                self.collection_size = results.count;
                Ok(())
            }
            Err(e) => {
                self.notifier.show_error(&format!("Error loading {}", self.config.type_name_plural), &e);
                Err(e)
            }
        }
    }

    pub async fn set_page(&mut self, page: u32) -> Result<(), ApiError> {
        self.page = page.max(1);
        self.reload_data().await
    }

    pub async fn set_page_size(&mut self, page_size: u32) -> Result<(), ApiError> {
        self.page_size = page_size.max(1);
        self.page = 1;
        self.reload_data().await
    }

    /// Sorting by the current field again flips the direction
    pub async fn on_sort(&mut self, field: &str) -> Result<(), ApiError> {
        if self.sort_field.as_deref() == Some(field) {
            self.sort_reverse = !self.sort_reverse;
        } else {
            self.sort_field = Some(field.to_string());
            self.sort_reverse = false;
        }
        self.reload_data().await
    }

    pub async fn on_name_filter_change(&mut self, name: &str) -> Result<(), ApiError> {
        self.name_filter = Some(name.to_string()).filter(|name| !name.is_empty());
        self.page = 1;
        self.reload_data().await
    }

    pub fn rows(&self) -> Vec<ListRow> {
        self.collection
            .iter()
            .map(|object| ListRow {
                id: object.id(),
                name: object.name().to_string(),
                extra: self.config.extra_columns.iter().map(|column| (column.value_fn)(object)).collect(),
            })
            .collect()
    }

    pub fn delete_message(&self, object: &T) -> String {
        match self.config.delete_message {
            Some(message_fn) => message_fn(object),
            None => format!("Do you really want to delete the {} \"{}\"?", self.config.type_name, object.name()),
        }
    }

    fn user_can(&self, action: PermissionAction) -> bool {
        self.config.permissions_disabled
            || self.permissions.current_user_can(action, self.config.permission_resource)
    }

    pub fn user_can_view(&self) -> bool {
        self.user_can(PermissionAction::View)
    }

    pub fn user_can_add(&self) -> bool {
        self.user_can(PermissionAction::Add)
    }

    pub fn user_can_edit(&self) -> bool {
        self.user_can(PermissionAction::Change)
    }

    pub fn user_can_delete(&self) -> bool {
        self.user_can(PermissionAction::Delete)
    }

    fn ensure_allowed(&self, action: PermissionAction) -> Result<(), ApiError> {
        if !self.user_can(action) {
            return Err(ApiError::PermissionDenied(
                action.codename().to_string(),
                self.config.type_name.to_string(),
            ));
        }
        Ok(())
    }

    async fn reload_after_change(&mut self) {
        if self.reload_data().await.is_err() {
            warn!("{} changed, but the list could not be reloaded", self.config.type_name_plural);
        }
    }

    pub async fn open_create_dialog<D: EditDialog<T>>(&mut self, dialog: &mut D) -> Result<Option<T>, ApiError> {
        self.ensure_allowed(PermissionAction::Add)?;
        let Some(object) = dialog.open(EditMode::Create, None)? else {
            return Ok(None);
        };
        match self.service.create(&object).await {
            Ok(created) => {
                info!("Created {} '{}'", self.config.type_name, created.name());
                self.notifier.show_info(&format!("Successfully created {} \"{}\".", self.config.type_name, created.name()));
                self.reload_after_change().await;
                Ok(Some(created))
            }
            Err(e) => {
                self.notifier.show_error(&format!("Error occurred while creating {}", self.config.type_name), &e);
                Err(e)
            }
        }
    }

    pub async fn open_edit_dialog<D: EditDialog<T>>(
        &mut self,
        object: &T,
        dialog: &mut D,
    ) -> Result<Option<T>, ApiError> {
        self.ensure_allowed(PermissionAction::Change)?;
        let Some(edited) = dialog.open(EditMode::Edit, Some(object))? else {
            return Ok(None);
        };
        match self.service.update(&edited).await {
            Ok(updated) => {
                info!("Updated {} '{}'", self.config.type_name, updated.name());
                self.notifier.show_info(&format!("Successfully updated {} \"{}\".", self.config.type_name, updated.name()));
                self.reload_after_change().await;
                Ok(Some(updated))
            }
            Err(e) => {
                self.notifier.show_error(
                    &format!("Error occurred while saving {} \"{}\"", self.config.type_name, object.name()),
                    &e,
                );
                Err(e)
            }
        }
    }

    /// Returns `Ok(false)` without touching the server when the user declines
    pub async fn open_delete_dialog<C: ConfirmDialog>(&mut self, object: &T, confirm: &mut C) -> Result<bool, ApiError> {
        self.ensure_allowed(PermissionAction::Delete)?;
        let id = object.id().ok_or_else(|| ApiError::NotSaved(object.name().to_string()))?;
        if !confirm.confirm("Confirm delete", &self.delete_message(object))? {
            return Ok(false);
        }
        match self.service.delete(id).await {
            Ok(()) => {
                info!("Deleted {} '{}'", self.config.type_name, object.name());
                self.notifier.show_info(&format!("Successfully deleted {} \"{}\".", self.config.type_name, object.name()));
                self.reload_after_change().await;
                Ok(true)
            }
            Err(e) => {
                self.notifier.show_error(&format!("Error while deleting {}", self.config.type_name), &e);
                Err(e)
            }
        }
    }
}
