use std::{
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info_span, log};

use super::{
    asset::{Asset, Output},
    config::AssetConfig,
    error::{AssetError, Result},
    raster::Rasterizer,
};
use crate::internal::WarnExt;

/// Renders every configured asset from one source and writes them out.
///
/// Nothing touches the output directory until all assets have been rendered
/// and encoded in memory, so a broken source never leaves stale or partial
/// files behind.
pub struct Pipeline {
    config: AssetConfig,
}

/// What a successful run produced, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files: Vec<GeneratedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub dimensions: String,
}

impl Pipeline {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    pub fn run(&self) -> Result<Summary> {
        let source = &self.config.source;
        if !source.is_file() {
            return Err(AssetError::SourceUnavailable {
                path: source.clone(),
            });
        }

        let span = info_span!("render", source = %source.display());
        let _guard = span.enter();

        let raster = Rasterizer::open(source)?;
        let assets = Asset::plan(&self.config);
        let outputs = assets
            .iter()
            .map(|asset| asset.render(&raster, &self.config.output_dir))
            .collect::<Result<Vec<_>>>()?;

        self.prepare_output_dir()?;
        for output in &outputs {
            write_output(output)?;
        }

        let files = assets
            .iter()
            .zip(outputs)
            .map(|(asset, output)| GeneratedFile {
                path: output.path,
                dimensions: asset.describe(),
            })
            .collect();
        Ok(Summary { files })
    }

    fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if dir.is_dir() {
            return Ok(());
        }
        if !self.config.create_output_dir {
            return Err(AssetError::Io {
                path: dir.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "output directory does not exist",
                ),
            });
        }
        log::info!("Creating output directory {:?}", dir);
        fs::create_dir_all(dir).map_err(AssetError::io(dir))
    }
}

fn write_output(output: &Output) -> Result<()> {
    let path = &output.path;
    let mut file = File::create(path).map_err(AssetError::io(path))?;

    if let Err(e) = file.write_all(&output.bytes).and_then(|_| file.flush()) {
        drop(file);
        fs::remove_file(path).warn(format!("Failed to remove partial file {:?}", path));
        return Err(AssetError::io(path)(e));
    }

    log::info!("✓ {} written", path.display());
    Ok(())
}

impl Summary {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generated files:")?;
        for file in &self.files {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            writeln!(f, "  - {} ({})", name, file.dimensions)?;
        }
        Ok(())
    }
}
