mod asset;
mod config;
mod error;
mod pipeline;
mod raster;

pub use asset::{composite_centered, Asset, Output};
pub use config::{AssetConfig, Color, CompositeTarget, ContainerTarget, IconTarget, InvalidColor};
pub use error::{AssetError, Result};
pub use pipeline::{GeneratedFile, Pipeline, Summary};
pub use raster::{rasterize, Rasterizer};
