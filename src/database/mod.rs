pub mod manager;
pub mod models;
pub mod record_store;
pub mod schema;
pub mod user_store;

pub use manager::{DatabaseError, DatabaseManager};
pub use record_store::{RecordStore, RecordStoreError};
pub use user_store::{UserStore, UserStoreError};
