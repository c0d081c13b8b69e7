//! # Shared Types Crate
//!
//! Cross-crate domain scalars for Quorum-Feed.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every scalar shared between the aggregation
//!   core, the crypto layer, and the scheduler is defined here.
//! - **Plain aliases**: newtypes are avoided where a transparent alias is
//!   enough; richer entities live in the aggregator's own domain layer.

pub mod entities;

pub use entities::*;
