//! lyra - Lyric Analysis CLI
//!
//! Reads lyrics from a file (or stdin), runs the analysis pipeline and prints
//! the result as JSON. Exits with status 1 when the analysis failed.

use anyhow::{bail, Context, Result};
use clap::Parser;
use lyra_common::config::ConfigResolver;
use lyra_engine::{
    AnalysisPipeline, AnalysisRequest, EngineConfig, EngineStrategy, SemanticHints,
    UserOverrides, VocalGender,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "lyra", version, about = "Analyze song lyrics into musical features")]
struct Cli {
    /// Lyrics file; stdin when omitted
    file: Option<PathBuf>,

    /// Config file (overrides LYRA_CONFIG and default locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed tempo
    #[arg(long)]
    bpm: Option<f64>,

    /// Fixed key, e.g. "A minor" or "F#"
    #[arg(long)]
    key: Option<String>,

    /// Explicit genre ("auto" to infer)
    #[arg(long)]
    genre: Option<String>,

    #[arg(long)]
    mood: Option<String>,

    /// Preferred vocal gender (male, female, duet, neutral)
    #[arg(long)]
    gender: Option<String>,

    /// Free-text vocal style
    #[arg(long)]
    vocal_profile: Option<String>,

    /// Comma-separated instrument list
    #[arg(long, value_delimiter = ',')]
    instruments: Vec<String>,

    /// Comma-separated section headers for the lyrics prompt
    #[arg(long, value_delimiter = ',')]
    structure: Vec<String>,

    /// JSON file with upstream semantic hints
    #[arg(long)]
    hints: Option<PathBuf>,

    /// Analysis strategy (standard, legacy_blend)
    #[arg(long)]
    strategy: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn overrides(&self) -> Result<UserOverrides> {
        let preferred_gender = match self.gender.as_deref() {
            Some(g) => match VocalGender::parse(g) {
                Some(parsed) => Some(parsed),
                None => bail!("Unknown vocal gender '{}'", g),
            },
            None => None,
        };
        let list = |values: &[String]| (!values.is_empty()).then(|| values.to_vec());

        Ok(UserOverrides {
            preferred_gender,
            bpm: self.bpm,
            key: self.key.clone(),
            genre: self.genre.clone(),
            mood: self.mood.clone(),
            vocal_profile: self.vocal_profile.clone(),
            instrumentation: list(&self.instruments),
            structure_hints: list(&self.structure),
        })
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Step 1: Resolve configuration
    let (toml_config, source) = ConfigResolver::new()
        .with_cli_path(cli.config.clone())
        .load();

    // Step 2: Logging
    lyra_common::logging::init_logging(&toml_config.logging)?;
    info!("lyra {}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration source: {:?}", source);

    // Step 3: Build pipeline
    let mut config = EngineConfig::from_settings(&toml_config.analysis)?;
    if let Some(strategy) = cli.strategy.as_deref() {
        config.strategy = strategy.parse::<EngineStrategy>()?;
    }
    let pipeline = AnalysisPipeline::builder().config(config).build();

    // Step 4: Build request
    let text = read_input(cli.file.as_ref())?;
    let mut request = AnalysisRequest::new(text).with_overrides(cli.overrides()?);
    if let Some(path) = &cli.hints {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read hints {}", path.display()))?;
        let hints: SemanticHints =
            serde_json::from_str(&raw).context("Invalid semantic hints JSON")?;
        request = request.with_hints(hints);
    }

    // Step 5: Analyze and print
    let result = pipeline.analyze(&request);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    Ok(if result.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
