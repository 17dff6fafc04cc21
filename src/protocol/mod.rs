//! Shell protocol
//!
//! Line commands of the interactive browser shell: parsing, dispatch onto a
//! browser session, and response formatting.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus};
pub use handlers::handle_command;
pub use parser::parse_command;
