//! Database access layer: ODBC connection provider and query executor.

pub mod executor;
pub mod params;
pub mod provider;
pub mod types;

pub use executor::QueryExecutor;
pub use provider::{ConnectionProvider, OdbcProvider};
pub use types::ColumnKind;
