pub mod config;
pub mod error;
pub mod redirect;
pub mod request;
pub mod tee;
pub mod upstream;
