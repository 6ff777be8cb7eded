pub mod address;
pub mod config;
pub mod error;
pub mod event;
pub mod mapper;
pub mod verdict;

pub use address::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use mapper::*;
pub use verdict::*;
