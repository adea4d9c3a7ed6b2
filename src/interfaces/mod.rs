pub mod source;

pub use source::PageSource;
