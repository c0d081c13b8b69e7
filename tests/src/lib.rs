//! # Quorum-Feed Test Suite
//!
//! Cross-crate integration flows:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── aggregator_flows.rs   # rotation, submission modes, delegation
//!     └── scheduler_flows.rs    # head-triggered scheduling end to end
//! ```
//!
//! Unit tests live next to the code they cover, inside each crate.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p qf-tests
//! ```

#[cfg(test)]
mod integration;
