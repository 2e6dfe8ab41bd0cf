//! Integration test crate for the admin data subsystem.
//!
//! No library code lives here; the tests under `tests/` run the normalizer
//! and the bootstrapper together against real temporary directories.
//!
//! ```sh
//! cargo test -p admin-data-integration-tests
//! ```
