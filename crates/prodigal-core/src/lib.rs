pub mod error;
pub mod recency;
pub mod traits;
pub mod types;

pub use error::*;
pub use recency::{Favorites, History, HISTORY_CAPACITY};
pub use traits::*;
pub use types::*;
