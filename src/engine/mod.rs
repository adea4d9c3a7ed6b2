pub mod cache;
pub mod paginator;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use paginator::{Paginator, PhotoCollection};
pub use service::GalleryService;
