//! Bank database migrations, embedded with include_str! so the binary
//! carries its own schema.
//!
//! The first entry must be the tracking-table DDL; the runner executes
//! it unconditionally before walking the rest in listed order.

/// Ordered (filename, sql) pairs. New migrations go at the end with the
/// next NNN_ prefix.
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
