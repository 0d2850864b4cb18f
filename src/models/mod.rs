pub mod config;
pub mod job;
pub mod status;

pub use config::*;
pub use job::*;
pub use status::*;
