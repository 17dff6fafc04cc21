//! Module `commands`
//!
//! Shell commands and the result of executing one.

use crate::listing::{SortDirection, SortKey};

/// A command typed at the shell prompt.
#[derive(Debug, PartialEq)]
pub enum Command {
    Connect {
        account: String,
        container: String,
        sas_token: String,
        path: Option<String>,
    },
    List,
    Cd(String),
    Pwd,
    /// Local files to upload into the current directory
    Put(Vec<String>),
    Get {
        name: String,
        dest: Option<String>,
    },
    Url(String),
    Rm(String),
    Mkdir(String),
    Sort {
        key: SortKey,
        direction: SortDirection,
    },
    Disconnect,
    Help,
    Quit,
    Unknown(String),
}

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Status plus the text shown to the user.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: Some(message.into()),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            message: Some(format!("error: {}", reason)),
            status: CommandStatus::Failure(reason),
        }
    }

    pub fn close(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::CloseConnection,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}
