pub mod ingest;
pub mod inventory;
mod parser;
pub mod store;
pub mod types;
pub mod utils;

pub use ingest::{IngestError, IngestOutcome, Ingester, Progress};
pub use parser::{clean_text, parse_report, validate_city_name};
