pub mod grouper;
pub mod packer;

pub use grouper::{group_features, FeatureGroup};
pub use packer::{pack_intervals, Packing, PixelInterval};
