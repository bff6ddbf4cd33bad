use std::{io, path::PathBuf};

use resvg::usvg;

pub type Result<T> = std::result::Result<T, AssetError>;

/// Everything that can stop an asset run. None of these are recovered from.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("source file {} not found", path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("failed to parse {} as an SVG document", path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: usvg::Error,
    },

    #[error("cannot rasterize at {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to encode {name}: {reason}")]
    EncodingFailure { name: String, reason: String },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    pub(crate) fn encoding<N, R>(name: N, reason: R) -> Self
    where
        N: Into<String>,
        R: ToString,
    {
        Self::EncodingFailure {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = AssetError::SourceUnavailable {
            path: PathBuf::from("public/favicon.svg"),
        };
        assert_eq!(err.to_string(), "source file public/favicon.svg not found");

        let err = AssetError::io("public/og-image.png")(io::Error::from(
            io::ErrorKind::PermissionDenied,
        ));
        assert!(err.to_string().contains("public/og-image.png"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn encoding_failure_carries_reason() {
        let err = AssetError::encoding("favicon.ico", "no sizes configured");
        assert_eq!(
            err.to_string(),
            "failed to encode favicon.ico: no sizes configured"
        );
    }
}
