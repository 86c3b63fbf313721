pub mod cluster;
pub mod config;
pub mod port;
pub mod schema;

pub use cluster::{binary_cache_dir, reinit, wal_reset, ClusterHandle};
pub use config::WorkConfig;
pub use port::{allocate_port, is_port_free, PORT_RANGE};
pub use schema::{run_migrations, CREATE_TABLES, MIGRATION_ID};
