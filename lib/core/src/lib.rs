pub mod auth;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{Claims, Role};
pub use error::ServiceError;
pub use module::Module;
pub use types::{ListParams, ListResult, merge_patch, new_id, now_rfc3339};
