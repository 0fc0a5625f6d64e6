pub mod cli_app;
pub mod command_logic;
pub mod config;
pub mod constants;
pub mod custom_fields;
pub mod document_list;
pub mod external_api;
pub mod management_list;
pub mod terminal;
