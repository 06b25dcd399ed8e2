pub mod config;
pub mod json_api;

pub use json_api::{Document, ErrorObject, Links, ResourceObject};
