use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Result;
use zstd::stream::read::Decoder;

use crate::loader::plain::read_lines;
use crate::loader::CorpusSource;

pub struct ZstdFileCorpus {
    filepath: PathBuf,
}

impl ZstdFileCorpus {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl CorpusSource for ZstdFileCorpus {
    fn lines(&self) -> Result<Vec<String>> {
        let reader = Decoder::new(File::open(&self.filepath)?)?;
        read_lines(BufReader::new(reader))
    }
}
