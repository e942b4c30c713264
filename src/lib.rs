#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod app;
pub mod config;
pub mod error;
pub mod links;
pub mod mailbox;
pub mod message;
pub mod store;

pub use app::{RunSummary, run};
pub use config::Config;
pub use error::{LoggerError, Result};
pub use links::{JobSite, extract_job_urls};
pub use mailbox::{GmailAuth, GmailClient, Mailbox};
pub use message::{BodyText, Message, Part, flatten};
