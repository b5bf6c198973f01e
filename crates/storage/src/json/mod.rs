mod file;
mod http;

pub use file::JsonFileProvider;
pub use http::HttpProvider;
