//! User list and per-user path derivation

pub mod paths;
pub mod users;

// Re-exports for library consumers
pub use paths::UserPaths;
pub use users::load_user_list;
