pub mod config;
pub mod dataset;
pub mod errors;

pub use config::*;
pub use dataset::*;
pub use errors::*;
