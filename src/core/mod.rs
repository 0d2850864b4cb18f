pub mod api;
pub mod clock;
pub mod config;
pub mod connection;
pub mod media;
pub mod orchestrator;
pub mod output;
pub mod upload;

pub use api::*;
pub use clock::*;
pub use config::*;
pub use connection::*;
pub use media::*;
pub use orchestrator::*;
pub use output::*;
pub use upload::*;
