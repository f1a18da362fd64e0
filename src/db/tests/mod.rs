//! Shared database repository test infrastructure
//!
//! The same test logic runs against both SQLite and PostgreSQL implementations:
//!
//! - **Unit tests (SQLite)**: Fast, in-memory tests that run with every `cargo test`
//! - **Integration tests (PostgreSQL)**: Slower tests using testcontainers, run with `cargo test -- --ignored`
//!
//! Each module contains shared test functions that take `&dyn Seed` plus the
//! repository under test, followed by a `sqlite_tests` and a `postgres_tests`
//! module that wire them to a concrete backend.
//!
//! ```bash
//! cargo test                       # Run fast SQLite tests only
//! cargo test -- --ignored          # Run PostgreSQL integration tests (requires Docker)
//! ```

mod invoices;
mod lookups;
