//! Value objects shared by the entities and the validation layer.

pub mod device;
pub mod image;
pub mod location;
pub mod search;

pub use device::DeviceInfo;
pub use image::{ImageRef, MAX_IMAGE_SIZE};
pub use location::{Address, Province};
pub use search::{AmountFilter, FeaturesFilter, LocationFilter, PriceFilter, RangeFilter, SearchFilter};
