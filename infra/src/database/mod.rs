//! Database access: connection pooling and the MySQL account repository.

pub mod connection;
pub mod mysql;

pub use connection::DatabasePool;
pub use mysql::MySqlAccountRepository;
