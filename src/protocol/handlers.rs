//! Command handlers for the browser shell.
//!
//! Each handler drives one [`BrowserSession`] operation and turns its outcome
//! into a [`CommandResult`].

use log::{error, info};
use std::path::Path;

use crate::auth::Credentials;
use crate::listing::{SortDirection, SortKey, SortOrder};
use crate::path::resolve;
use crate::protocol::responses::{HELP_TEXT, format_listing, format_path, human_size};
use crate::protocol::{Command, CommandResult};
use crate::session::{BrowserSession, UploadFile};
use crate::storage::{MetadataApi, ObjectStore};

/// Dispatches a parsed command onto the session.
///
/// `confirm` is asked before anything is deleted.
pub async fn handle_command<M, S>(
    session: &mut BrowserSession<M, S>,
    command: Command,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> CommandResult
where
    M: MetadataApi,
    S: ObjectStore,
{
    match command {
        Command::Connect {
            account,
            container,
            sas_token,
            path,
        } => handle_cmd_connect(session, &account, &container, &sas_token, path.as_deref()).await,
        Command::List => handle_cmd_list(session).await,
        Command::Cd(target) => handle_cmd_cd(session, &target).await,
        Command::Pwd => handle_cmd_pwd(session),
        Command::Put(files) => handle_cmd_put(session, &files).await,
        Command::Get { name, dest } => handle_cmd_get(session, &name, dest.as_deref()).await,
        Command::Url(name) => handle_cmd_url(session, &name).await,
        Command::Rm(name) => handle_cmd_rm(session, &name, confirm).await,
        Command::Mkdir(name) => handle_cmd_mkdir(session, &name).await,
        Command::Sort { key, direction } => handle_cmd_sort(session, key, direction),
        Command::Disconnect => {
            session.disconnect().await;
            CommandResult::success("Disconnected")
        }
        Command::Help => CommandResult::success(HELP_TEXT),
        Command::Quit => {
            session.disconnect().await;
            CommandResult::close("Goodbye")
        }
        Command::Unknown(raw) if raw.is_empty() => CommandResult::failure("Empty command"),
        Command::Unknown(raw) => {
            CommandResult::failure(format!("Unknown or malformed command: {} (try HELP)", raw))
        }
    }
}

async fn handle_cmd_connect<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    account: &str,
    container: &str,
    sas_token: &str,
    path: Option<&str>,
) -> CommandResult {
    let credentials = match Credentials::new(account, container, sas_token) {
        Ok(credentials) => credentials,
        Err(e) => return CommandResult::failure(e.to_string()),
    };

    match session.connect(credentials, path).await {
        Ok(()) => CommandResult::success(format!(
            "Connected to {}\n{}",
            container,
            format_listing(session.current_path(), session.entries())
        )),
        Err(e) if session.is_connected() => CommandResult::failure(format!(
            "Connected to {}, but listing {} failed: {}",
            container,
            format_path(session.current_path()),
            e
        )),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

async fn handle_cmd_list<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
) -> CommandResult {
    match session.refresh().await {
        Ok(()) => CommandResult::success(format_listing(session.current_path(), session.entries())),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

/// Opens `target` when it names a listed directory, otherwise resolves it
/// against the current directory (`..`, `.` and a leading `/` are understood).
async fn handle_cmd_cd<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    target: &str,
) -> CommandResult {
    if !session.is_connected() {
        return CommandResult::failure("Not connected");
    }

    let outcome = match session.entry(target).filter(|e| e.is_dir()).cloned() {
        Some(dir) => session.open(&dir).await,
        None => {
            let resolved = resolve(session.current_path(), target);
            session.navigate(resolved.as_str()).await
        }
    };
    match outcome {
        Ok(()) => CommandResult::success(format!(
            "{}\n{}",
            format_path(session.current_path()),
            format_listing(session.current_path(), session.entries())
        )),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

fn handle_cmd_pwd<M: MetadataApi, S: ObjectStore>(session: &BrowserSession<M, S>) -> CommandResult {
    match session.container() {
        Some(container) => CommandResult::success(format!(
            "{}:{}",
            container,
            format_path(session.current_path())
        )),
        None => CommandResult::failure("Not connected"),
    }
}

async fn handle_cmd_put<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    files: &[String],
) -> CommandResult {
    if !session.is_connected() {
        return CommandResult::failure("Not connected");
    }

    let mut queue = Vec::with_capacity(files.len());
    for local in files {
        let Some(name) = Path::new(local).file_name().and_then(|n| n.to_str()) else {
            return CommandResult::failure(format!("Not a file: {}", local));
        };
        match tokio::fs::read(local).await {
            Ok(data) => queue.push(UploadFile::new(name, data)),
            Err(e) => {
                error!("Failed to read '{}': {}", local, e);
                return CommandResult::failure(format!("Cannot read {}: {}", local, e));
            }
        }
    }

    match session.upload(queue).await {
        Ok(report) => {
            let mut message = format!("Uploaded {} file(s)", report.uploaded.len());
            if let Some(refresh_error) = report.refresh_error {
                message.push_str(&format!(" (listing refresh failed: {})", refresh_error));
            }
            CommandResult::success(message)
        }
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

async fn handle_cmd_get<M: MetadataApi, S: ObjectStore>(
    session: &BrowserSession<M, S>,
    name: &str,
    dest: Option<&str>,
) -> CommandResult {
    let Some(entry) = session.entry(name) else {
        return missing_entry(session, name);
    };

    let download = match session.download(entry).await {
        Ok(download) => download,
        Err(e) => return CommandResult::failure(e.to_string()),
    };

    let dest = dest.unwrap_or(&download.name);
    if let Err(e) = tokio::fs::write(dest, &download.data).await {
        error!("Failed to write '{}': {}", dest, e);
        return CommandResult::failure(format!("Cannot write {}: {}", dest, e));
    }

    info!("Saved '{}' to '{}'", entry.path(), dest);
    CommandResult::success(format!(
        "Saved {} ({}, {}) to {}",
        download.name,
        human_size(download.data.len() as u64),
        download.content_type,
        dest
    ))
}

async fn handle_cmd_url<M: MetadataApi, S: ObjectStore>(
    session: &BrowserSession<M, S>,
    name: &str,
) -> CommandResult {
    let Some(entry) = session.entry(name) else {
        return missing_entry(session, name);
    };

    match session.download_url(entry).await {
        Ok(url) => CommandResult::success(url),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

async fn handle_cmd_rm<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    name: &str,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> CommandResult {
    let Some(entry) = session.entry(name).cloned() else {
        return missing_entry(session, name);
    };

    let prompt = if entry.is_dir() {
        format!("Delete directory {}/ and everything in it?", entry.name())
    } else {
        format!("Delete {}?", entry.name())
    };
    if !confirm(&prompt) {
        return CommandResult::success("Cancelled");
    }

    match session.delete(&entry).await {
        Ok(()) => CommandResult::success(format!("Deleted {}", entry.path())),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

async fn handle_cmd_mkdir<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    name: &str,
) -> CommandResult {
    match session.create_directory(name).await {
        Ok(path) => CommandResult::success(format!("Created {}", format_path(&path))),
        Err(e) => CommandResult::failure(e.to_string()),
    }
}

fn handle_cmd_sort<M: MetadataApi, S: ObjectStore>(
    session: &mut BrowserSession<M, S>,
    key: SortKey,
    direction: SortDirection,
) -> CommandResult {
    session.set_sort(SortOrder::new(key, direction));
    CommandResult::success(format_listing(session.current_path(), session.entries()))
}

fn missing_entry<M: MetadataApi, S: ObjectStore>(
    session: &BrowserSession<M, S>,
    name: &str,
) -> CommandResult {
    if session.is_connected() {
        CommandResult::failure(format!("No such entry: {}", name))
    } else {
        CommandResult::failure("Not connected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CommandStatus, parse_command};
    use crate::storage::{Broker, DirectStore, MemoryConnector, MemoryContainer};
    use std::sync::Arc;

    fn shell() -> (BrowserSession<Broker, DirectStore>, Arc<MemoryContainer>) {
        let container = Arc::new(MemoryContainer::with_objects(
            "box",
            [("docs/readme.md", "hello"), ("big.bin", "0123456789abcdef")],
        ));
        let connector = Arc::new(MemoryConnector::new(container.clone()));
        let session = BrowserSession::new(
            Broker::new(connector.clone(), ".keep"),
            DirectStore::new(connector),
        );
        (session, container)
    }

    async fn run(
        session: &mut BrowserSession<Broker, DirectStore>,
        line: &str,
    ) -> CommandResult {
        handle_command(session, parse_command(line), &mut |_| true).await
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let (mut session, _) = shell();
        let result = run(&mut session, "LS").await;
        assert_eq!(result.status, CommandStatus::Failure("Not connected".into()));
        let result = run(&mut session, "CD docs").await;
        assert_eq!(result.status, CommandStatus::Failure("Not connected".into()));
    }

    #[tokio::test]
    async fn test_connect_cd_and_pwd() {
        let (mut session, _) = shell();
        let result = run(&mut session, "CONNECT acct box sv=1&sig=2 box/docs").await;
        assert!(result.is_success());
        assert!(result.message.unwrap().contains("readme.md"));

        let result = run(&mut session, "PWD").await;
        assert_eq!(result.message.as_deref(), Some("box:/docs"));

        assert!(run(&mut session, "CD ..").await.is_success());
        assert!(session.current_path().is_root());
    }

    #[tokio::test]
    async fn test_rm_asks_for_confirmation() {
        let (mut session, container) = shell();
        run(&mut session, "CONNECT acct box sv=1").await;

        let result = handle_command(&mut session, parse_command("RM big.bin"), &mut |_| false).await;
        assert_eq!(result.message.as_deref(), Some("Cancelled"));
        assert!(container.contains("big.bin"));

        let mut asked = Vec::new();
        let result = handle_command(&mut session, parse_command("RM docs"), &mut |prompt| {
            asked.push(prompt.to_string());
            true
        })
        .await;
        assert!(result.is_success());
        assert_eq!(asked, vec!["Delete directory docs/ and everything in it?".to_string()]);
        assert!(!container.contains("docs/readme.md"));
    }

    #[tokio::test]
    async fn test_sort_and_mkdir() {
        let (mut session, _) = shell();
        run(&mut session, "CONNECT acct box sv=1").await;

        assert!(run(&mut session, "MKDIR archive").await.is_success());
        let listing = run(&mut session, "SORT name desc").await.message.unwrap();
        let names: Vec<&str> = listing.lines().map(|l| l.trim().rsplit(' ').next().unwrap()).collect();
        assert_eq!(names, vec!["docs/", "archive/", "big.bin"]);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let (mut session, _) = shell();
        let result = run(&mut session, "FROB").await;
        assert!(matches!(result.status, CommandStatus::Failure(_)));
    }
}
