pub const CONFIG_DIR: &str = ".config/pcf";
pub const CONFIG_FILE: &str = "config.json";
pub const ENV_PAPERLESS_URL: &str = "PAPERLESS_URL";
pub const ENV_PAPERLESS_TOKEN: &str = "PAPERLESS_TOKEN";
pub const ENTER_INSTANCE_URL_PAPERLESS: &str = "Enter the url of the Paperless instance: ";
pub const ENTER_PAPERLESS_API_TOKEN: &str = "Enter the Paperless API token: ";
pub const COMPLETE_SETUP: &str = "To view the available commands, type: pcf --help";

/// Standard message
#[derive(Debug)]
pub enum Message {
    ConfigSaved(String),
    FieldsPage(u32, u64, u64),
    NoFieldsFound,
    DocumentsWithField(String, u64),
}

impl Message {
    pub fn to_formatted_string(&self) -> String {
        match self {
            Message::ConfigSaved(path) => format!("Config saved to {}. {}", path, COMPLETE_SETUP),
            Message::FieldsPage(page, page_count, total) => {
                format!("Page {} of {} ({} custom fields)", page, page_count, total)
            }
            Message::NoFieldsFound => "No custom fields found".to_string(),
            Message::DocumentsWithField(name, count) => {
                format!("{} document(s) have the field \"{}\"", count, name)
            }
        }
    }
}
