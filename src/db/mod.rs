pub mod models;
pub mod pool;

/// Embedded DDL applied by `clubctl init-db`.
pub const SCHEMA_SQL: &str = include_str!("../../db/schema.sql");
