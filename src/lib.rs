pub mod app;

mod internal;

pub use app::{AssetConfig, AssetError, Pipeline, Summary};
