pub mod cli;
pub mod error;
pub mod runtime;
pub mod signals;

pub use error::Error;
