//! Pipeline steps, each applied to the whole user list

pub mod clean_cache;
pub mod copy_profiles;
pub mod link_profiles;
pub mod utils;
