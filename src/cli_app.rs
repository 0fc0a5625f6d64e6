use std::io::{BufRead, Stdin, Stdout, Write};

use clap::{Args, Parser, Subcommand};

use crate::command_logic::custom_fields::{
    create_custom_field, delete_custom_field, documents_with_custom_field, edit_custom_field, list_custom_fields,
    show_custom_field, FieldArgsDialog,
};
use crate::config::Config;
use crate::constants::Message;
use crate::external_api::paperless_api::models::custom_field::CustomFieldDataType;
use crate::external_api::paperless_api::{ListParams, PaperlessApi};
use crate::external_api::ApiError;
use crate::terminal::{AutoConfirm, PromptConfirm, TerminalNotifier};

#[derive(Parser)]
#[command(
    name = "pcf",
    version = "0.1.0",
    about = "CLI for managing custom fields of a Paperless-ngx instance. pcf - Paperless Custom Fields",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the instance url and API token
    Init,
    /// Actions with custom fields
    Fields(FieldsArgs),
}

#[derive(Args)]
pub struct FieldsArgs {
    #[command(subcommand)]
    pub command: FieldsCommands,
}

#[derive(Subcommand)]
pub enum FieldsCommands {
    /// Show one page of custom fields
    List(ListArgs),
    /// Show a custom field
    Show(IdArgs),
    /// Create a custom field
    Create(CreateArgs),
    /// Rename a custom field or change its options
    Edit(EditArgs),
    /// Delete a custom field
    Delete(DeleteArgs),
    /// Show documents that have the custom field set
    Documents(IdArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only fields whose name contains this text
    #[arg(long, short)]
    pub name: Option<String>,
    /// Page number
    #[arg(long, short, value_parser = validate_u32_more_then_zero)]
    pub page: Option<u32>,
    /// Fields per page
    #[arg(long, value_parser = validate_u32_more_then_zero)]
    pub page_size: Option<u32>,
    /// Sort field
    #[arg(long, short, default_value = "name")]
    pub sort: String,
    /// Reverse the sort order
    #[arg(long, short)]
    pub reverse: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Custom field id
    #[arg(long, short, required = true, value_parser = validate_u32_more_then_zero)]
    pub id: u32,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Field name
    #[arg(long, short, required = true)]
    pub name: String,
    /// Data type: string, url, date, boolean, integer, float, monetary, documentlink, select
    #[arg(long = "type", short = 't', required = true, value_parser = parse_data_type)]
    pub data_type: CustomFieldDataType,
    /// Option of a select field, may be repeated
    #[arg(long)]
    pub select_option: Vec<String>,
    /// Currency of a monetary field, e.g. EUR
    #[arg(long)]
    pub default_currency: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Custom field id
    #[arg(long, short, required = true, value_parser = validate_u32_more_then_zero)]
    pub id: u32,
    /// New field name
    #[arg(long, short)]
    pub name: Option<String>,
    /// Option of a select field, may be repeated
    #[arg(long)]
    pub select_option: Vec<String>,
    /// Currency of a monetary field, e.g. EUR
    #[arg(long)]
    pub default_currency: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Custom field id
    #[arg(long, short, required = true, value_parser = validate_u32_more_then_zero)]
    pub id: u32,
    /// Don't ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

fn validate_u32_more_then_zero(value: &str) -> Result<u32, ApiError> {
    let id: u32 = value.parse().map_err(|_| ApiError::Parse(value.to_string()))?;
    if id == 0 {
        return Err(ApiError::IdMoreThenZero);
    }
    Ok(id)
}

fn parse_data_type(value: &str) -> Result<CustomFieldDataType, ApiError> {
    CustomFieldDataType::from_wire(&value.to_lowercase())
}

/// Ask for the settings and write the config file
pub fn init_config<R: BufRead, W: Write>(input: R, output: W) -> Result<String, ApiError> {
    let config = Config::new(input, output)?;
    let path = Config::config_path()?;
    config.save(&path)?;
    Ok(Message::ConfigSaved(path.display().to_string()).to_formatted_string())
}

pub async fn handle_command(
    args: FieldsArgs,
    api: &PaperlessApi,
    page_size: u32,
    stdin: Stdin,
    stdout: Stdout,
) -> Result<(), ApiError> {
    let notifier = TerminalNotifier::new(&stdout);
    let (action, result) = match args.command {
        FieldsCommands::List(value) => {
            let params = ListParams {
                page: value.page,
                page_size: Some(value.page_size.unwrap_or(page_size)),
                sort_field: Some(value.sort),
                sort_reverse: value.reverse,
                name_filter: value.name,
            };
            ("list custom fields", list_custom_fields(api, &notifier, params).await)
        }
        FieldsCommands::Show(value) => ("show custom field", show_custom_field(api, value.id).await),
        FieldsCommands::Create(value) => {
            let mut dialog = FieldArgsDialog {
                name: Some(value.name),
                data_type: Some(value.data_type),
                select_options: value.select_option,
                default_currency: value.default_currency,
            };
            ("create custom field", create_custom_field(api, &notifier, &mut dialog).await)
        }
        FieldsCommands::Edit(value) => {
            let mut dialog = FieldArgsDialog {
                name: value.name,
                data_type: None,
                select_options: value.select_option,
                default_currency: value.default_currency,
            };
            ("edit custom field", edit_custom_field(api, &notifier, value.id, &mut dialog).await)
        }
        FieldsCommands::Delete(value) => {
            let result = if value.yes {
                delete_custom_field(api, &notifier, value.id, page_size, &mut AutoConfirm).await
            } else {
                let mut confirm = PromptConfirm::new(stdin.lock(), &stdout);
                delete_custom_field(api, &notifier, value.id, page_size, &mut confirm).await
            };
            ("delete custom field", result)
        }
        FieldsCommands::Documents(value) => {
            ("show documents", documents_with_custom_field(api, value.id, page_size).await)
        }
    };
    match result {
        Ok(value) => {
            if !value.is_empty() {
                println!("{}", value);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to {}: {}", action, e);
            Err(e)
        }
    }
}
