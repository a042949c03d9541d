//! Convenience re-exports for common use.

pub use crate::auth::{Credentials, MemoryTokenStore, TokenStore};
pub use crate::client::CrmClient;
pub use crate::config::CrmConfig;
pub use crate::error::{CrmError, ErrorKind};
pub use crate::pagination::{PageRequest, RecordCursor};
pub use crate::records::{
    Facade, ListRequest, Record, SearchRequest, SortBy, SortOrder, UpsertRequest,
};
