use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{error, info};
use rayon::prelude::*;
use simplenote_mxl::generator::{self, DocumentBuilder};
use simplenote_mxl::model::{Score, ScoreRequest};
use simplenote_mxl::profile::CompatProfile;
use std::collections::HashMap;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Compressed MusicXML archive
    Mxl,
    /// Plain MusicXML document
    Xml,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Mxl => "mxl",
            Format::Xml => "musicxml",
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert SimpleNote JSON scores to MusicXML", long_about = None)]
struct Cli {
    /// Score request JSON files, or directories to search for *.json
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<Utf8PathBuf>,

    /// Directory for generated files
    #[arg(short, long, default_value = ".")]
    out_dir: Utf8PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Mxl)]
    format: Format,

    /// Encoding date (YYYY-MM-DD) instead of today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// JSON file overriding the compatibility profile
    #[arg(long, value_name = "FILE")]
    profile: Option<Utf8PathBuf>,
}

fn collect_inputs(inputs: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Walk {}", input))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = Utf8PathBuf::from_path_buf(entry.into_path())
                    .map_err(|p| anyhow!("Non-UTF8 path {}", p.display()))?;
                if path.extension() == Some("json") {
                    files.push(path);
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn output_path(input: &Utf8Path, cli: &Cli) -> Utf8PathBuf {
    let stem = input.file_stem().unwrap_or("score");
    cli.out_dir.join(format!("{}.{}", stem, cli.format.extension()))
}

/// Reject input sets where two requests would write the same output file.
fn check_unique_outputs(inputs: &[Utf8PathBuf], cli: &Cli) -> Result<()> {
    let mut seen: HashMap<Utf8PathBuf, &Utf8PathBuf> = HashMap::new();
    for input in inputs {
        let dest = output_path(input, cli);
        if let Some(prev) = seen.insert(dest.clone(), input) {
            bail!("{} and {} would both write {}", prev, input, dest);
        }
    }
    Ok(())
}

fn convert(input: &Utf8Path, cli: &Cli, profile: &CompatProfile) -> Result<Utf8PathBuf> {
    let file = std::fs::File::open(input).with_context(|| format!("Open {}", input))?;
    let request = ScoreRequest::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Read {}", input))?;
    let score = Score::try_from(request).with_context(|| format!("Invalid score {}", input))?;

    let mut builder = DocumentBuilder::new(profile);
    if let Some(date) = cli.date {
        builder = builder.with_encoding_date(date);
    }
    let tree = builder.build(&score);

    let dest = output_path(input, cli);
    match cli.format {
        Format::Mxl => generator::write_mxl_file(&tree, &cli.out_dir, &dest)?,
        Format::Xml => generator::write_xml_file(&tree, &cli.out_dir, &dest)?,
    }
    Ok(dest)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let profile = match &cli.profile {
        Some(path) => CompatProfile::from_file(path)?,
        None => CompatProfile::default(),
    };
    std::fs::create_dir_all(&cli.out_dir).with_context(|| format!("Create {}", cli.out_dir))?;

    let inputs = collect_inputs(&cli.inputs)?;
    if inputs.is_empty() {
        bail!("No score requests found");
    }
    check_unique_outputs(&inputs, &cli)?;

    let failures = inputs
        .par_iter()
        .filter(|input| match convert(input, &cli, &profile) {
            Ok(dest) => {
                info!("{} -> {}", input, dest);
                false
            }
            Err(err) => {
                error!("{}: {:#}", input, err);
                true
            }
        })
        .count();

    if failures > 0 {
        bail!("{} of {} conversions failed", failures, inputs.len());
    }
    Ok(())
}
