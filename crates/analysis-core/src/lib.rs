pub mod error;
pub mod numeric;
pub mod types;

pub use error::*;
pub use types::*;
