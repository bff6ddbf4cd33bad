use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf, str::FromStr};
use tracing::log;

/// What to render and where to put it.
///
/// Every field has a default, so a config file only needs the keys it wants
/// to override.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Create `output_dir` when it is missing instead of failing.
    pub create_output_dir: bool,
    pub icons: Vec<IconTarget>,
    pub favicon: ContainerTarget,
    pub og_image: CompositeTarget,
}

/// A single square PNG.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IconTarget {
    pub name: String,
    pub size: u32,
}

/// A multi-resolution `.ico` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerTarget {
    pub name: String,
    pub sizes: Vec<u32>,
}

/// The source centered on a solid backdrop, e.g. an Open Graph preview.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeTarget {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub icon_size: u32,
    pub background: Color,
}

impl IconTarget {
    pub fn new<S: Into<String>>(name: S, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("public/favicon.svg"),
            output_dir: PathBuf::from("public"),
            create_output_dir: true,
            icons: vec![
                IconTarget::new("favicon-16x16.png", 16),
                IconTarget::new("favicon-32x32.png", 32),
                IconTarget::new("apple-touch-icon.png", 180),
                IconTarget::new("android-chrome-192x192.png", 192),
                IconTarget::new("android-chrome-512x512.png", 512),
            ],
            favicon: ContainerTarget::default(),
            og_image: CompositeTarget::default(),
        }
    }
}

impl Default for ContainerTarget {
    fn default() -> Self {
        Self {
            name: "favicon.ico".into(),
            sizes: vec![16, 32, 48],
        }
    }
}

impl Default for CompositeTarget {
    fn default() -> Self {
        Self {
            name: "og-image.png".into(),
            width: 1200,
            height: 630,
            icon_size: 512,
            background: Color([0x0d, 0x11, 0x17]),
        }
    }
}

impl AssetConfig {
    pub fn parse<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::parse(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to load config file {:?}, using default config: {:?}",
                    path,
                    e
                );
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for icon in &self.icons {
            anyhow::ensure!(!icon.name.is_empty(), "icon name must not be empty");
            anyhow::ensure!(icon.size > 0, "{}: size must be positive", icon.name);
        }

        let favicon = &self.favicon;
        anyhow::ensure!(!favicon.name.is_empty(), "favicon name must not be empty");
        anyhow::ensure!(
            !favicon.sizes.is_empty(),
            "{}: at least one size is required",
            favicon.name
        );
        anyhow::ensure!(
            favicon.sizes.iter().all(|&s| (1..=256).contains(&s)),
            "{}: sizes must be between 1 and 256",
            favicon.name
        );

        let og = &self.og_image;
        anyhow::ensure!(!og.name.is_empty(), "og_image name must not be empty");
        anyhow::ensure!(og.icon_size > 0, "{}: icon_size must be positive", og.name);
        anyhow::ensure!(
            og.icon_size <= og.width && og.icon_size <= og.height,
            "{}: a {}px icon does not fit a {}x{} canvas",
            og.name,
            og.icon_size,
            og.width,
            og.height
        );
        Ok(())
    }
}

/// An opaque color, written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

#[derive(Debug, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct InvalidColor(String);

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| InvalidColor(s.to_owned()))?;

        let mut rgb = [0u8; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| InvalidColor(s.to_owned()))?;
        }
        Ok(Self(rgb))
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_asset_names() {
        let config = AssetConfig::default();
        let names: Vec<_> = config
            .icons
            .iter()
            .map(|i| (i.name.as_str(), i.size))
            .collect();
        assert_eq!(
            names,
            [
                ("favicon-16x16.png", 16),
                ("favicon-32x32.png", 32),
                ("apple-touch-icon.png", 180),
                ("android-chrome-192x192.png", 192),
                ("android-chrome-512x512.png", 512),
            ]
        );
        assert_eq!(config.favicon.sizes, [16, 32, 48]);
        assert_eq!(config.og_image.background.to_string(), "#0d1117");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn color_parsing() {
        assert_eq!("#0d1117".parse::<Color>().unwrap(), Color([13, 17, 23]));
        assert_eq!("#FFffFF".parse::<Color>().unwrap(), Color([255, 255, 255]));
        for bad in ["0d1117", "#0d111", "#0d11177", "#zz1117", "#ééé"] {
            assert!(bad.parse::<Color>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config: AssetConfig = toml::from_str(
            r##"
            output_dir = "dist"

            [og_image]
            background = "#ffffff"
            "##,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.source, PathBuf::from("public/favicon.svg"));
        assert_eq!(config.og_image.background, Color([255, 255, 255]));
        assert_eq!(config.og_image.width, 1200);
        assert_eq!(config.icons.len(), 5);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = AssetConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: AssetConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn validate_rejects_oversized_icon() {
        let mut config = AssetConfig::default();
        config.og_image.icon_size = 700;
        assert!(config.validate().is_err());

        let mut config = AssetConfig::default();
        config.favicon.sizes.clear();
        assert!(config.validate().is_err());

        let mut config = AssetConfig::default();
        config.icons.push(IconTarget::new("zero.png", 0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert_eq!(AssetConfig::parse_or_default(&missing), AssetConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "icons = 3").unwrap();
        assert!(AssetConfig::parse(&broken).is_err());
        assert_eq!(AssetConfig::parse_or_default(&broken), AssetConfig::default());

        let good = dir.path().join("good.toml");
        fs::write(&good, "source = \"art/logo.svg\"").unwrap();
        assert_eq!(
            AssetConfig::parse_or_default(&good).source,
            PathBuf::from("art/logo.svg")
        );
    }
}
