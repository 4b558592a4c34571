use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Result;
use flate2::read::GzDecoder;

use crate::loader::plain::read_lines;
use crate::loader::CorpusSource;

pub struct GzFileCorpus {
    filepath: PathBuf,
}

impl GzFileCorpus {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl CorpusSource for GzFileCorpus {
    fn lines(&self) -> Result<Vec<String>> {
        let reader = GzDecoder::new(File::open(&self.filepath)?);
        read_lines(BufReader::new(reader))
    }
}
