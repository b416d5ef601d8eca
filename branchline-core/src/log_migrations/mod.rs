//! Schema for the separate log database, embedded the same way as the
//! bank migrations: tracking table first, then the rest in order.

/// Ordered (filename, sql) pairs for logs.duckdb.
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
