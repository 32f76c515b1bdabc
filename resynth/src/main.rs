use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resynth::{FilterChoice, SynthOptions, WindowPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "resynth")]
#[command(version)]
#[command(about = "Resynthesize audio textures with wavelet tree learning", long_about = None)]
struct Cli {
    /// More log output (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resynthesize an audio file into a new mono WAV
    Synth {
        /// Input audio file (mp3, wav, flac, ogg, etc.)
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        #[command(flatten)]
        knobs: SynthArgs,
    },
    /// Show information about an audio file
    Info {
        /// Input audio file
        input: PathBuf,
        /// Window size as a power of two
        #[arg(long, default_value = "13")]
        window_levels: usize,
    },
    /// Spectral similarity of two audio files
    Compare {
        a: PathBuf,
        b: PathBuf,
    },
    /// Print the default options as JSON
    Config,
}

#[derive(clap::Args)]
struct SynthArgs {
    /// JSON options file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Wavelet filter (daub4, pwt4, pwt10, pwt12)
    #[arg(long)]
    filter: Option<FilterChoice>,
    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,
    /// First level to learn
    #[arg(long, allow_negative_numbers = true)]
    start_level: Option<i32>,
    /// Last level to learn
    #[arg(long, allow_negative_numbers = true)]
    stop_level: Option<i32>,
    /// Window size as a power of two (13 = 8192 samples)
    #[arg(long)]
    window_levels: Option<usize>,
    /// Fraction of each level considered as candidates (0.0-1.0)
    #[arg(long)]
    sampling: Option<f32>,
    /// Fraction of candidates kept after ranking (0 keeps all)
    #[arg(long)]
    candidate_factor: Option<f32>,
    /// Distance slack, relative to the mean, counted as a tie
    #[arg(long)]
    tolerance: Option<f32>,
    /// Keep the two root coefficients in order
    #[arg(long)]
    no_root_flip: bool,
    /// Rank candidates by predecessors instead of ancestors
    #[arg(long)]
    predecessors_first: bool,
    /// Take the first of equally good candidates
    #[arg(long)]
    first_tie: bool,
    /// Zero-pad the last window instead of truncating it
    #[arg(long)]
    pad: bool,
    /// Write attempts per window
    #[arg(long)]
    retries: Option<u32>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Synth {
            input,
            output,
            knobs,
        } => {
            synth(&input, &output, knobs)?;
        }
        Commands::Info {
            input,
            window_levels,
        } => {
            info(&input, window_levels)?;
        }
        Commands::Compare { a, b } => {
            compare(&a, &b)?;
        }
        Commands::Config => {
            println!("{}", SynthOptions::default().to_json()?);
        }
    }

    Ok(())
}

fn build_options(args: &SynthArgs) -> Result<SynthOptions> {
    let mut options = match &args.config {
        Some(path) => SynthOptions::from_json_file(path)?,
        None => SynthOptions::default(),
    };

    if let Some(filter) = args.filter {
        options = options.with_filter(filter);
    }
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    if let Some(window_levels) = args.window_levels {
        options = options.with_window_levels(window_levels);
        // keep the default sweep inside a smaller window
        if args.stop_level.is_none() && args.config.is_none() {
            options = options.with_stop_level_fitted();
        }
    }
    if args.start_level.is_some() || args.stop_level.is_some() {
        let learner = &options.config.learner;
        let start = args.start_level.unwrap_or(learner.start_level);
        let stop = args.stop_level.unwrap_or(learner.stop_level);
        options = options.with_levels(start, stop);
    }
    if let Some(sampling) = args.sampling {
        options = options.with_sampling(sampling);
    }
    if let Some(factor) = args.candidate_factor {
        options = options.with_candidate_factor(factor);
    }
    if let Some(tolerance) = args.tolerance {
        options = options.with_match_tolerance(tolerance);
    }
    if args.no_root_flip {
        options = options.with_randomize_root_order(false);
    }
    if args.predecessors_first {
        options = options.with_ancestors_first(false);
    }
    if args.first_tie {
        options = options.with_randomize_ties(false);
    }
    if args.pad {
        options = options.with_window_policy(WindowPolicy::Pad);
    }
    if let Some(retries) = args.retries {
        options = options.with_write_retries(retries);
    }

    options.validate()?;
    Ok(options)
}

fn synth(input: &Path, output: &Path, args: SynthArgs) -> Result<()> {
    let options = build_options(&args)?;
    let learner = &options.config.learner;

    if !args.json {
        println!("Resynthesizing {}...", input.display());
        println!(
            "  Filter: {}, window: {} samples",
            options.config.filter,
            options.config.window_len()
        );
        println!(
            "  Levels: {}..={}, seed: {}",
            learner.start_level, learner.stop_level, learner.seed
        );
    }

    let summary =
        resynth::resynthesize_file(input, output, &options).context("Resynthesis failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Windows: {}", summary.windows);
    println!(
        "  Samples: {} in, {} out",
        summary.samples_in, summary.samples_out
    );
    if summary.dropped_samples > 0 {
        println!("  Dropped tail: {} samples", summary.dropped_samples);
    }
    println!("  Spectral similarity: {:.1}%", summary.similarity * 100.0);

    Ok(())
}

fn info(input: &Path, window_levels: usize) -> Result<()> {
    let window_len = 1usize << window_levels.clamp(1, libtreesynth::MAX_TREE_LEVELS);
    let info = resynth::get_audio_file_info(input, window_len)?;

    println!("Audio File");
    println!("───────────────────────────────");
    if let Some(format) = &info.source_format {
        println!("  Format: {}", format);
    }
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Channels: {}", info.channels);
    println!("  Duration: {:.2}s", info.duration_secs);
    println!("  Mono samples: {}", info.samples);
    println!(
        "  Windows of {}: {} full, {} tail samples",
        window_len, info.full_windows, info.tail_samples
    );

    Ok(())
}

fn compare(a: &Path, b: &Path) -> Result<()> {
    let a_bytes = fs::read(a).with_context(|| format!("Failed to read {}", a.display()))?;
    let b_bytes = fs::read(b).with_context(|| format!("Failed to read {}", b.display()))?;
    let score = resynth::compare_audio(&a_bytes, &b_bytes)?;

    println!("Spectral similarity: {:.1}%", score * 100.0);
    Ok(())
}
