pub mod app;
pub mod app_dirs;
pub mod config;
pub mod cue;
pub mod error;
pub mod logging;
pub mod prompts;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;

pub use app::{App, Flow};
pub use config::SessionConfig;
pub use session::{Phase, Session, SessionState, Snapshot};
