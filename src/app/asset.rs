use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use image::{
    codecs::png::{CompressionType, FilterType, PngEncoder},
    imageops, DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage,
};
use tracing::log;

use super::{
    config::{AssetConfig, Color, CompositeTarget, ContainerTarget, IconTarget},
    error::{AssetError, Result},
    raster::Rasterizer,
};

/// One output file and the way it is produced from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// The source at one size, as an RGBA PNG.
    Png(IconTarget),
    /// The source at several sizes packed into a `.ico`, smallest first.
    Icon(ContainerTarget),
    /// The source centered on an opaque backdrop, as an RGB PNG.
    Composite(CompositeTarget),
}

/// An encoded file waiting to be written.
#[derive(Debug, Clone)]
pub struct Output {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Asset {
    /// The full asset list in emission order: single PNGs, then the icon
    /// container, then the composite.
    pub fn plan(config: &AssetConfig) -> Vec<Self> {
        config
            .icons
            .iter()
            .cloned()
            .map(Asset::Png)
            .chain([
                Asset::Icon(config.favicon.clone()),
                Asset::Composite(config.og_image.clone()),
            ])
            .collect()
    }

    pub fn name(&self) -> &str {
        match self {
            Asset::Png(t) => &t.name,
            Asset::Icon(t) => &t.name,
            Asset::Composite(t) => &t.name,
        }
    }

    /// Human readable dimensions, e.g. `16x16, 32x32`.
    pub fn describe(&self) -> String {
        match self {
            Asset::Png(t) => format!("{0}x{0}", t.size),
            Asset::Icon(t) => icon_sizes(t)
                .iter()
                .map(|s| format!("{s}x{s}"))
                .collect::<Vec<_>>()
                .join(", "),
            Asset::Composite(t) => format!("{}x{}", t.width, t.height),
        }
    }

    pub fn render(&self, raster: &Rasterizer, dir: &Path) -> Result<Output> {
        log::info!("Generating {} ({})...", self.name(), self.describe());
        let bytes = match self {
            Asset::Png(t) => encode_png(&t.name, &raster.render(t.size, t.size)?)?,
            Asset::Icon(t) => encode_icon(raster, t)?,
            Asset::Composite(t) => {
                let icon = DynamicImage::ImageRgba8(raster.render(t.icon_size, t.icon_size)?);
                let canvas = composite_centered(t, &icon)?;
                encode_opaque_png(&t.name, &canvas)?
            }
        };
        log::info!("✓ {} rendered ({} bytes)", self.name(), bytes.len());

        Ok(Output {
            path: dir.join(self.name()),
            bytes,
        })
    }
}

fn icon_sizes(target: &ContainerTarget) -> Vec<u32> {
    let mut sizes = target.sizes.clone();
    sizes.sort_unstable();
    sizes.dedup();
    sizes
}

fn encode_png(name: &str, image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| AssetError::encoding(name, e))?;
    Ok(bytes)
}

fn encode_opaque_png(name: &str, image: &RgbaImage) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| AssetError::encoding(name, e))?;
    Ok(bytes)
}

/// Packs every size into one container. The first entry is the primary image
/// that single-image readers pick up, so sizes go in ascending order.
fn encode_icon(raster: &Rasterizer, target: &ContainerTarget) -> Result<Vec<u8>> {
    let sizes = icon_sizes(target);
    if sizes.is_empty() {
        return Err(AssetError::encoding(&target.name, "no sizes configured"));
    }

    let mut icon_dir = ico::IconDir::new(ico::ResourceType::Icon);
    for size in sizes {
        if size > 256 {
            return Err(AssetError::encoding(
                &target.name,
                format!("{size}px exceeds the 256px icon limit"),
            ));
        }
        let image = raster.render(size, size)?;
        let icon_image = ico::IconImage::from_rgba_data(size, size, image.into_raw());
        let entry = ico::IconDirEntry::encode(&icon_image)
            .map_err(|e| AssetError::encoding(&target.name, e))?;
        icon_dir.add_entry(entry);
        log::debug!("{}: added {size}x{size} layer", target.name);
    }

    let mut bytes = Cursor::new(Vec::new());
    icon_dir
        .write(&mut bytes)
        .map_err(|e| AssetError::encoding(&target.name, e))?;
    Ok(bytes.into_inner())
}

/// Places `icon` in the middle of an opaque canvas. Icons with an alpha
/// channel are blended, others are pasted as is.
pub fn composite_centered(target: &CompositeTarget, icon: &DynamicImage) -> Result<RgbaImage> {
    let (w, h) = (icon.width(), icon.height());
    if w > target.width || h > target.height {
        return Err(AssetError::encoding(
            &target.name,
            format!(
                "{w}x{h} icon does not fit a {}x{} canvas",
                target.width, target.height
            ),
        ));
    }

    let Color([r, g, b]) = target.background;
    let mut canvas = RgbaImage::from_pixel(target.width, target.height, Rgba([r, g, b, 255]));

    let x = i64::from((target.width - w) / 2);
    let y = i64::from((target.height - h) / 2);
    if icon.color().has_alpha() {
        imageops::overlay(&mut canvas, &icon.to_rgba8(), x, y);
    } else {
        imageops::replace(&mut canvas, &icon.to_rgba8(), x, y);
    }
    Ok(canvas)
}
