pub mod normalize;

pub use normalize::{derive_id, is_filtered, resolve, to_hd};
