#![forbid(unsafe_code)]

pub mod error;
pub mod generator;
pub mod model;
pub mod scorer;
pub mod time;
pub mod timer;

pub use error::Error;
pub use time::Clock;
