//! Directory browser session
//!
//! Stateful controller over one container connection: current path,
//! projected listing, and the operations that change them.

pub mod browser;
pub mod events;
pub mod results;
pub mod state;

pub use browser::BrowserSession;
pub use events::{SessionEvent, UploadProgress};
pub use results::{Download, UploadFile, UploadReport};
pub use state::SessionState;
