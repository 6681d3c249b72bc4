//! profile-mover library
//!
//! Relocates per-user browser profile data to a central directory and links
//! the original location to the relocated copy.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod steps;
