pub mod ragalahari;

pub use ragalahari::{AlbumPage, GalleryPage, Ragalahari};
