use std::io::BufRead;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Error};
use clap::Parser;
use clap_stdin::MaybeStdin;
use mrtd::bundle::DocumentBundle;
use mrtd::config::Config;
use mrtd::engine::VerificationEngine;
use mrtd::mrz::{self, MrzRecognizer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Verify a saved document bundle and print the verification status as JSON.
    Verify {
        /// JSON document bundle.
        bundle: PathBuf,
        /// Directory of CSCA certificates, consulted after the configured ones.
        #[arg(long = "csca-dir")]
        csca_dirs: Vec<PathBuf>,
    },
    /// Read typed or scanned MRZ text from standard input and print every BAC key recognized.
    Scan,
    /// Print the ICAO 9303 check digit of an MRZ field.
    CheckDigit {
        /// The field, e.g. a document number or a YYMMDD date.
        field: MaybeStdin<String>,
    },
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_toml_file(path).context("could not load configuration")?,
        None => Config::default(),
    };

    match args.action {
        Action::Verify { bundle, csca_dirs } => verify(&config, bundle, csca_dirs),
        Action::Scan => scan(&config),
        Action::CheckDigit { field } => {
            println!("{}", check_digit(&field)?);
            Ok(())
        }
    }
}

fn verify(config: &Config, bundle: PathBuf, csca_dirs: Vec<PathBuf>) -> Result<(), Error> {
    let bundle = DocumentBundle::from_json_file(&bundle).context("could not load document")?;
    let trust_stores = config.trust_stores(csca_dirs);
    let status = VerificationEngine::new(config.verification_options()).run(
        &bundle,
        &trust_stores,
        &bundle.replay_session(),
    );
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn scan(config: &Config) -> Result<(), Error> {
    let mut recognizer = MrzRecognizer::with_options(config.mrz_options());
    let start = Instant::now();

    for line in std::io::stdin().lock().lines() {
        let line = line.context("could not read standard input")?;
        let now = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        // Line breaks are not fed, so the two lines of an ID-1 card end up adjacent.
        for key in recognizer.feed_str(&line, now) {
            println!("{}", serde_json::to_string(&key)?);
        }
    }
    Ok(())
}

fn check_digit(field: &str) -> Result<char, Error> {
    let field = field.trim().to_ascii_uppercase();
    mrz::check_digit(&field).with_context(|| format!("could not compute check digit of {field}"))
}
