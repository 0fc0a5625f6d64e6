use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::env;
use std::fs::{self, File};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use directories::UserDirs;
use log::debug;

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE, ENTER_INSTANCE_URL_PAPERLESS, ENTER_PAPERLESS_API_TOKEN, ENV_PAPERLESS_TOKEN,
    ENV_PAPERLESS_URL,
};
use crate::external_api::ApiError;
use crate::management_list::DEFAULT_PAGE_SIZE;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Instance url
    pub paperless_base_url: String,
    /// Token for authorization in Paperless API
    pub paperless_api_token: String,
    /// Page size of list commands
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Config {
    /// Ask the user for the instance url and the API token
    pub fn new<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<Self, ApiError> {
        write!(output, "{ENTER_INSTANCE_URL_PAPERLESS}")?;
        output.flush()?;
        let paperless_base_url = validate_url(read_line(&mut input)?)?;

        write!(output, "{ENTER_PAPERLESS_API_TOKEN}")?;
        output.flush()?;
        let paperless_api_token = read_line(&mut input)?;
        validate_api_token(&paperless_api_token)?;

        Ok(Self { paperless_base_url, paperless_api_token, page_size: DEFAULT_PAGE_SIZE })
    }

    /// ~/.config/pcf/config.json
    pub fn config_path() -> Result<PathBuf, ApiError> {
        UserDirs::new()
            .ok_or(ApiError::NotFoundUserDir)
            .map(|user_dirs| user_dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Read the config file
    pub fn get_config(path_to_config: &Path) -> Result<Self, ApiError> {
        let file = File::open(path_to_config)
            .map_err(|_| ApiError::ConfigNotFound(path_to_config.display().to_string()))?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Config file with `PAPERLESS_URL` / `PAPERLESS_TOKEN` taking precedence.
    /// The file may be missing when both variables are set.
    pub fn load() -> Result<Self, ApiError> {
        let path = Self::config_path()?;
        let from_file = if path.exists() { Some(Self::get_config(&path)?) } else { None };
        Self::merge(
            from_file,
            env::var(ENV_PAPERLESS_URL).ok(),
            env::var(ENV_PAPERLESS_TOKEN).ok(),
            &path,
        )
    }

    fn merge(
        from_file: Option<Self>,
        env_url: Option<String>,
        env_token: Option<String>,
        path: &Path,
    ) -> Result<Self, ApiError> {
        let config = match (from_file, env_url, env_token) {
            (Some(config), url, token) => Self {
                paperless_base_url: url.unwrap_or(config.paperless_base_url),
                paperless_api_token: token.unwrap_or(config.paperless_api_token),
                page_size: config.page_size,
            },
            (None, Some(url), Some(token)) => Self {
                paperless_base_url: url,
                paperless_api_token: token,
                page_size: DEFAULT_PAGE_SIZE,
            },
            _ => return Err(ApiError::ConfigNotFound(path.display().to_string())),
        };
        let paperless_base_url = validate_url(config.paperless_base_url)?;
        validate_api_token(&config.paperless_api_token)?;
        debug!("Using Paperless instance {paperless_base_url}");
        Ok(Self { paperless_base_url, ..config })
    }

    /// Write the config, creating the directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|_| ApiError::CantCreateConfig)
    }
}

/// The entered string must be a URL
fn validate_url(mut value: String) -> Result<String, ApiError> {
    let regex = Regex::new(r"^https?://.+$").map_err(|_| ApiError::InvalidUrl)?;
    if !regex.is_match(&value) {
        return Err(ApiError::InvalidUrl);
    }
    if value.ends_with('/') {
        value.pop();
    }
    Ok(value)
}

/// Validate the API token
fn validate_api_token(value: &str) -> Result<(), ApiError> {
    let regex = Regex::new(r"^\S+$").map_err(|_| ApiError::InvalidToken)?;
    if !regex.is_match(value) {
        return Err(ApiError::InvalidToken);
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String, ApiError> {
    let mut input_value = String::new();
    input.read_line(&mut input_value)?;
    Ok(input_value.trim().to_string())
}
