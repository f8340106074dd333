pub mod aggregate;
pub mod errors;
pub mod topn;
pub mod types;

pub use errors::*;
