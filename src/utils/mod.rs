pub mod constants;
pub mod naming;
pub mod progress;
pub mod time;

pub use constants::*;
pub use naming::{canonical_name, qc_agg_name, qc_tests_name, readable_label, slugify};
pub use progress::ProgressReporter;
pub use time::{now_seconds, seconds_from_utc_string, utc_string_from_seconds};
