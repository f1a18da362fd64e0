//! End-to-end tests that drive the full router.

#[cfg(all(test, feature = "database-sqlite"))]
mod support;
