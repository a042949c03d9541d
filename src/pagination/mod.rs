//! Lazy, forward-only iteration over page-based list endpoints.

pub mod cursor;
pub mod request;

pub use cursor::RecordCursor;
pub use request::{Decoder, PageRequest, MAX_PER_PAGE};
