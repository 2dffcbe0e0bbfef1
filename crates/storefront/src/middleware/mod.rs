//! Request extractors and middleware.

pub mod profile;

pub use profile::{CartProfile, PROFILE_HEADER};
