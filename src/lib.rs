pub mod auth;
pub mod config;
pub mod error;
pub mod listing;
pub mod path;
pub mod protocol;
pub mod server;
pub mod session;
pub mod storage;

pub use server::Server;
pub use session::BrowserSession;
