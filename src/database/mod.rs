pub mod sqlx;

pub use self::sqlx::{RunStore, StoredRun};
