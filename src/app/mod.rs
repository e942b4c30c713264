pub mod row;
pub mod run;

pub use row::{display_date, display_date_in, rows_for_message};
pub use run::{RunSummary, reset_files, run};
