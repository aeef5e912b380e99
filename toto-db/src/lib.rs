pub mod error;
pub mod models;
pub mod store;
pub mod validate;

pub use error::{Result, TotoError};
