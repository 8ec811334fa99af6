mod commands;

mod config;
pub use self::config::{Config, Host};

mod location;
pub use self::location::S3Location;

pub mod progressbar;

mod start;
pub use self::start::start;

mod upload;
pub use self::upload::{Source, Upload, upload};
