//! Where the domain meets concrete technology: DuckDB for the account
//! store and audit trails, plus the seeded demo data.

pub mod demo;
pub mod duckdb;
