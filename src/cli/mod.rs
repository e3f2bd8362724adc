//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod assemble;
mod extract;
mod info;
mod recode;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{load_config, ConfigError, EncodeSection};
use crate::gif::EncodeConfig;
use crate::quantize::Method;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// gifanim - Decode, inspect and re-encode animated GIFs
#[derive(Parser)]
#[command(name = "gifanim")]
#[command(about = "gifanim - Decode, inspect and re-encode animated GIFs")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show dimensions, frame count and frame durations of a GIF
    Info {
        /// Input GIF file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a GIF and encode it again with new settings
    Recode {
        /// Input GIF file
        input: PathBuf,

        /// Output GIF file
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },

    /// Write one composited frame as PNG
    Extract {
        /// Input GIF file
        input: PathBuf,

        /// Frame index (0-based)
        #[arg(short, long, default_value = "0")]
        frame: usize,

        /// Output file or directory.
        /// If omitted: {input}_frame{N}.png
        /// If directory (ends with /): dir/{input}_frame{N}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scale output by integer factor (1-16)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: u8,
    },

    /// Build an animated GIF from still images
    Assemble {
        /// Input images or glob patterns, in frame order
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output GIF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        encode: EncodeArgs,
    },
}

/// Encoder flags shared by `recode` and `assemble`. Each flag overrides the
/// matching `gifanim.toml` value.
#[derive(Args, Debug, Default, Clone)]
pub struct EncodeArgs {
    /// Config file (default: gifanim.toml found by walking up from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Palette bit depth (1-8)
    #[arg(long)]
    pub bits: Option<u8>,

    /// Quantization method
    #[arg(long, value_enum)]
    pub method: Option<Method>,

    /// Repeat count, 0 loops forever
    #[arg(long)]
    pub loops: Option<u16>,

    /// Alpha cutoff: -1 auto, 255 opaque, 0-254 explicit
    #[arg(long, allow_hyphen_values = true)]
    pub alpha_threshold: Option<i32>,

    /// Frame delay in hundredths of a second, -1 keeps each frame's own
    #[arg(long, allow_hyphen_values = true)]
    pub duration: Option<i32>,

    /// Error-diffusion strength for the spatial method (0.0-1.0)
    #[arg(long)]
    pub dither: Option<f32>,

    /// Diffusion kernel size for the spatial method (1, 3 or 5)
    #[arg(long)]
    pub filter_size: Option<u8>,

    /// Sampling divisor for the neural method (1-30)
    #[arg(long)]
    pub sample_factor: Option<i32>,
}

impl EncodeArgs {
    /// Apply the flags on top of a config section.
    pub fn apply(&self, section: &mut EncodeSection) {
        if let Some(bits) = self.bits {
            section.bits = bits;
        }
        if let Some(method) = self.method {
            section.method = method;
        }
        if let Some(loops) = self.loops {
            section.loops = loops;
        }
        if let Some(alpha) = self.alpha_threshold {
            section.alpha_threshold = alpha;
        }
        if let Some(duration) = self.duration {
            section.duration = duration;
        }
        if let Some(dither) = self.dither {
            section.spatial.dither = dither;
        }
        if let Some(filter_size) = self.filter_size {
            section.spatial.filter_size = filter_size;
        }
        if let Some(sample_factor) = self.sample_factor {
            section.neural.sample_factor = sample_factor;
        }
    }

    /// Load the config file, apply the flags and validate the result.
    pub fn resolve(&self) -> Result<EncodeConfig, ConfigError> {
        let mut config = load_config(self.config.as_deref())?;
        self.apply(&mut config.encode);

        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
        }
        Ok(config.encode_config())
    }
}

/// Resolve encode settings, printing the failure and returning its exit code.
pub(crate) fn resolve_encode_config(args: &EncodeArgs) -> Result<EncodeConfig, ExitCode> {
    args.resolve().map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            ConfigError::Validation(_) => ExitCode::from(EXIT_INVALID_ARGS),
            _ => ExitCode::from(EXIT_ERROR),
        }
    })
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    // A logger may already be installed when run inside a test harness
    let _ = builder.format_timestamp(None).try_init();
}

/// Parse arguments and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => info::run_info(&input, json),
        Commands::Recode { input, output, encode } => recode::run_recode(&input, &output, &encode),
        Commands::Extract { input, frame, output, scale } => {
            extract::run_extract(&input, frame, output.as_deref(), scale)
        }
        Commands::Assemble { inputs, output, encode } => {
            assemble::run_assemble(&inputs, &output, &encode)
        }
    }
}
