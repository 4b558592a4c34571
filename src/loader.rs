mod gz;
mod plain;
mod zst;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

pub use crate::loader::gz::GzFileCorpus;
pub use crate::loader::plain::{PlainFileCorpus, TextCorpus};
pub use crate::loader::zst::ZstdFileCorpus;

/// Source of corpus lines.
pub trait CorpusSource {
    /// Reads every line, without line terminators.
    fn lines(&self) -> Result<Vec<String>>;
}

/// File formats supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorpusFormat {
    Plain,
    Gzip,
    Zstd,
}

impl CorpusFormat {
    /// Infers the format from the file extension, defaulting to plain text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("gz") => Self::Gzip,
            Some("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }

    /// Reads every line of the file at `path`.
    pub fn read_lines<P: AsRef<Path>>(self, path: P) -> Result<Vec<String>> {
        match self {
            Self::Plain => PlainFileCorpus::new(path).lines(),
            Self::Gzip => GzFileCorpus::new(path).lines(),
            Self::Zstd => ZstdFileCorpus::new(path).lines(),
        }
    }
}

impl FromStr for CorpusFormat {
    type Err = &'static str;

    fn from_str(fmt: &str) -> Result<Self, Self::Err> {
        match fmt {
            "plain" => Ok(Self::Plain),
            "gzip" => Ok(Self::Gzip),
            "zstd" => Ok(Self::Zstd),
            _ => Err("Invalid format"),
        }
    }
}

/// Loads several corpus files in parallel and concatenates their lines in the
/// order of `paths`. The format of each file is inferred from its extension.
pub fn load_corpora<P>(paths: &[P]) -> Result<Vec<String>>
where
    P: AsRef<Path> + Sync,
{
    let corpora = paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            CorpusFormat::from_path(path)
                .read_lines(path)
                .with_context(|| format!("failed to read corpus {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let lines: Vec<String> = corpora.into_iter().flatten().collect();
    info!(files = paths.len(), lines = lines.len(), "loaded corpus");
    Ok(lines)
}
