pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, DbPoolError, PgPool};
pub use postgres::PgStore;
pub use store::{JobFilters, JobStore, MemoryStore, StoreError};
