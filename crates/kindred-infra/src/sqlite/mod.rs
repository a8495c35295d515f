//! SQLite repository implementations (sqlx).

pub mod image;
pub mod pool;
pub mod profile;
pub mod session;
