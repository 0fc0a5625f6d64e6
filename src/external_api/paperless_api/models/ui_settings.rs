use serde::Deserialize;

/// Only the part of `/api/ui_settings/` needed for permission checks
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UiSettings {
    #[serde(default)]
    pub permissions: Vec<String>,
}
