pub mod config;
pub mod record;
pub mod payload;
pub mod transport;
pub mod component;
pub mod sender;
pub mod layer;

pub mod init;
pub mod env;
