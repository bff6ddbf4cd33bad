use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;
use resvg::{tiny_skia, usvg};
use tracing::log;

use super::error::{AssetError, Result};

/// A parsed SVG document that can be rendered at any pixel size.
pub struct Rasterizer {
    path: PathBuf,
    tree: usvg::Tree,
}

impl Rasterizer {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssetError::SourceUnavailable { path: path.clone() },
            _ => AssetError::Io {
                path: path.clone(),
                source: e,
            },
        })?;
        Self::from_data(path, &data)
    }

    /// Parses an in-memory document. `path` is only used for diagnostics and to
    /// resolve relative `href`s.
    pub fn from_data<P: Into<PathBuf>>(path: P, data: &[u8]) -> Result<Self> {
        let path = path.into();

        let mut options = usvg::Options {
            resources_dir: path.parent().map(Path::to_path_buf),
            ..Default::default()
        };
        Arc::make_mut(&mut options.fontdb).load_system_fonts();

        let tree = usvg::Tree::from_data(data, &options).map_err(|source| {
            AssetError::MalformedInput {
                path: path.clone(),
                source,
            }
        })?;

        let size = tree.size();
        log::debug!(
            "Parsed {:?}, intrinsic size {}x{}",
            path,
            size.width(),
            size.height()
        );
        Ok(Self { path, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the whole document stretched to exactly `width` x `height`.
    pub fn render(&self, width: u32, height: u32) -> Result<RgbaImage> {
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(AssetError::InvalidSize { width, height })?;

        let size = self.tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&self.tree, transform, &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha, image expects straight alpha.
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let c = pixel.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        log::debug!("Rendered {:?} at {}x{}", self.path, width, height);
        RgbaImage::from_raw(width, height, data).ok_or(AssetError::InvalidSize { width, height })
    }
}

/// Reads `path` and renders it once.
pub fn rasterize<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<RgbaImage> {
    Rasterizer::open(path)?.render(width, height)
}
