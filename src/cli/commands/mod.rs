pub mod completions;
pub mod contact;
pub mod destroy;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod log_cmd;
pub mod passcode;
pub mod put;
pub mod verify;
