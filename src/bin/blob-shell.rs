//! blob-shell - interactive container browser
//!
//! Talks to a running broker for listings and directory changes, and moves
//! file bytes straight to and from the storage account.

use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use blob_explorer::BrowserSession;
use blob_explorer::config::ExplorerConfig;
use blob_explorer::error::ExplorerError;
use blob_explorer::error::handlers::handle_error;
use blob_explorer::protocol::{CommandStatus, handle_command, parse_command};
use blob_explorer::protocol::responses::human_size;
use blob_explorer::session::SessionEvent;
use blob_explorer::storage::{ApiClient, AzureConnector, DirectStore};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ExplorerError> {
    let config = ExplorerConfig::load()?;
    let metadata = ApiClient::new(
        config.shell.api_base_url.clone(),
        config.storage.request_timeout(),
    )?;
    let store = DirectStore::new(Arc::new(AzureConnector::new(&config.storage)?));
    info!("Using broker at {}", config.shell.api_base_url);

    let mut session = BrowserSession::new(metadata, store);
    session.subscribe(print_event);

    println!("blob-shell - type HELP for commands");
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print_prompt(session.container(), session.current_path().as_str())?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            session.disconnect().await;
            break;
        }

        let command = parse_command(&line);
        let result = handle_command(&mut session, command, &mut confirm).await;

        if let Some(message) = &result.message {
            match result.status {
                CommandStatus::Failure(_) => eprintln!("{}", message),
                _ => println!("{}", message),
            }
        }
        if result.status == CommandStatus::CloseConnection {
            break;
        }
    }

    Ok(())
}

fn print_prompt(container: Option<&str>, path: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    match container {
        Some(container) => write!(stdout, "{}:/{}> ", container, path)?,
        None => write!(stdout, "> ")?,
    }
    stdout.flush()
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            error!("Failed to read confirmation: {}", e);
            false
        }
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::ContainerPrefixStripped { original, resolved } => {
            eprintln!("note: '{}' repeats the container name; using '/{}'", original, resolved);
        }
        SessionEvent::UploadProgress(progress) => {
            eprint!(
                "\r{}: {} / {}",
                progress.file,
                human_size(progress.transferred),
                human_size(progress.total)
            );
            if progress.transferred >= progress.total {
                eprintln!();
            }
        }
        SessionEvent::RefreshFailed(detail) => {
            eprintln!("warning: listing refresh failed: {}", detail);
        }
        SessionEvent::StateChanged(_) | SessionEvent::UploadCompleted { .. } => {}
    }
}
