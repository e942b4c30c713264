pub mod flatten;
pub mod types;

pub use flatten::{BodyText, flatten, flatten_part};
pub use types::{Header, Message, Part, PartBody};
