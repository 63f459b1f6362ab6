pub mod client;
pub mod headers;
pub mod lines;
pub mod request;
pub mod response;
