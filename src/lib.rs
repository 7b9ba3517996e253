pub mod config;
pub mod exception;
pub mod file;
pub mod param;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use config::Config;
pub use exception::Exception;
pub use file::{FileDirectory, FileStore, LocalFileStore};
pub use param::{HttpEncoding, HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::Response;
pub use router::Router;
pub use server::{handle_connection, Server};
