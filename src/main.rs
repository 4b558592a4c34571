use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use string_encoding::loader::load_corpora;
use string_encoding::{
    DenseMatrix, EncodeTarget, EncoderConfig, EncodingPolicy, LabelSequences, PolicyKind,
    SparseMatrix, StringEncoding, ValueRows,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One zero-padded row per line.
    Dense,
    /// `[row, col, value]` triples of non-zero cells.
    Sparse,
    /// One variable-length row per line.
    Jagged,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Corpus files; plain text, *.gz or *.zst
    #[arg(short, long, num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    /// JSON encoder config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from a saved encoder instead of an empty one. The archive must
    /// hold the configured policy; its saved policy settings replace the config's
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Save the encoder after encoding
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Shape of the printed output
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jagged)]
    output: OutputFormat,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EncoderConfig::from_json_path(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => EncoderConfig::default(),
    };
    let lines = load_corpora(&args.input)?;

    match config.policy {
        PolicyKind::Dictionary => {
            run::<_, LabelSequences>(&args, &config, config.dictionary_policy(), &lines)
        }
        PolicyKind::BagOfWords => {
            run::<_, LabelSequences>(&args, &config, config.bag_of_words_policy(), &lines)
        }
        PolicyKind::TfIdf => run::<_, ValueRows>(&args, &config, config.tf_idf_policy(), &lines),
    }
}

/// Builds the map over the corpus, encodes it and prints one JSON value per line.
/// `J` is the row-per-line output of the policy.
fn run<P, J>(args: &Args, config: &EncoderConfig, policy: P, lines: &[String]) -> Result<()>
where
    P: EncodingPolicy + Serialize + DeserializeOwned,
    DenseMatrix: EncodeTarget<P>,
    SparseMatrix: EncodeTarget<P>,
    J: EncodeTarget<P> + Default + Serialize,
{
    let mut encoder = match &args.load {
        Some(path) => StringEncoding::<P>::load(path)
            .with_context(|| {
                format!(
                    "failed to load {} encoder {}",
                    P::NAME,
                    path.display()
                )
            })?,
        None => StringEncoding::new(policy),
    };
    encoder.set_strict(config.strict);

    let tokenizer = config.tokenizer();
    for line in lines {
        encoder.create_map(line, &tokenizer);
    }
    info!(tokens = encoder.dictionary().len(), "built dictionary");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.output {
        OutputFormat::Dense => {
            let mut output = DenseMatrix::default();
            encoder.encode(lines, &mut output, &tokenizer)?;
            for row in output.to_rows() {
                writeln!(out, "{}", serde_json::to_string(&row)?)?;
            }
        }
        OutputFormat::Sparse => {
            let mut output = SparseMatrix::default();
            encoder.encode(lines, &mut output, &tokenizer)?;
            for cell in output.iter() {
                writeln!(out, "{}", serde_json::to_string(&cell)?)?;
            }
        }
        OutputFormat::Jagged => {
            let mut output = J::default();
            encoder.encode(lines, &mut output, &tokenizer)?;
            let value = serde_json::to_value(&output)?;
            let Some(rows) = value.as_array() else {
                bail!("row output did not serialize to a list");
            };
            for row in rows {
                writeln!(out, "{row}")?;
            }
        }
    }
    out.flush()?;

    if let Some(path) = &args.save {
        encoder
            .save(path)
            .with_context(|| format!("failed to save encoder {}", path.display()))?;
    }
    Ok(())
}
