pub mod account;
pub mod camp;
pub mod emergency;
pub mod medicine;
pub mod notification;
pub mod prescription;
pub mod worker;

pub use account::*;
pub use camp::*;
pub use emergency::*;
pub use medicine::*;
pub use notification::*;
pub use prescription::*;
pub use worker::*;

use uuid::Uuid;

/// Parse a TEXT uuid column. Rows are written by this crate, so a parse
/// failure can only mean external corruption; fall back to the nil uuid.
pub(crate) fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap_or_default()
}
