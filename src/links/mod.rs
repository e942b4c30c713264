pub mod extractor;
pub mod html;
pub mod sites;

pub use extractor::{canonicalize, extract_from_message, extract_job_urls};
pub use html::html_to_text;
pub use sites::JobSite;
