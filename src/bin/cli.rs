use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use shapeshift::dsp::shaper::{Character, Mode, ShapingPolicy};
use shapeshift::engine::params::{
    CUTOFF_HZ, INPUT_GAIN_DB, OUTPUT_GAIN_DB, Params, parse_frequency, parse_gain_db,
};
use shapeshift::io::render::{RenderOptions, render_file};
use shapeshift::settings::Settings;
use std::ops::RangeInclusive;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shapeshift")]
#[command(version)]
#[command(about = "Waveshaping distortion into a one-pole lowpass, rendered offline.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a WAV file block by block through the engine
    Render(RenderArgs),
    /// List the available transfer curves
    Modes,
    /// Print the effective settings and where they are stored
    Settings {
        /// Overwrite the settings file with defaults first
        #[arg(long)]
        reset: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct RenderArgs {
    /// Source WAV file
    input: PathBuf,
    /// Destination WAV file (defaults to a timestamped file in the output directory)
    output: Option<PathBuf>,

    #[arg(long, value_parser = input_gain, help = "Input gain, 0 to 30 dB")]
    input_gain: Option<f32>,
    #[arg(long, value_parser = output_gain, help = "Output gain, -12 to 12 dB")]
    output_gain: Option<f32>,
    #[arg(long, value_parser = cutoff, help = "Lowpass cutoff, 20 Hz to 18 kHz")]
    cutoff: Option<f32>,
    #[arg(long, value_parser = cutoff, help = "Step the cutoff towards this value once per block")]
    sweep_to: Option<f32>,

    #[arg(long, value_enum, conflicts_with_all = ["top", "character"])]
    mode: Option<Mode>,
    #[arg(long, value_enum, requires = "bottom", help = "Curve for samples >= 0")]
    top: Option<Mode>,
    #[arg(long, value_enum, requires = "top", help = "Curve for samples < 0")]
    bottom: Option<Mode>,
    #[arg(long, value_enum, conflicts_with = "top")]
    character: Option<Character>,

    #[arg(long, help = "Frames per processing block")]
    block_size: Option<u32>,
    #[arg(
        long,
        env = "SHAPESHIFT_OUTPUT_DIR",
        help = "Directory for renders without an explicit output path"
    )]
    output_dir: Option<String>,
}

impl RenderArgs {
    /// Settings values, overridden by whatever was given on the command line.
    fn params(&self, base: Params) -> Params {
        let shaping = match (self.character, self.top, self.bottom, self.mode) {
            (Some(character), ..) => character.into(),
            (None, Some(top), Some(bottom), _) => ShapingPolicy::Split { top, bottom },
            (None, _, _, Some(mode)) => mode.into(),
            _ => base.shaping,
        };

        Params {
            input_gain_db: self.input_gain.unwrap_or(base.input_gain_db),
            output_gain_db: self.output_gain.unwrap_or(base.output_gain_db),
            shaping,
            cutoff_hz: self.cutoff.unwrap_or(base.cutoff_hz),
        }
    }
}

fn in_range(value: f32, range: &RangeInclusive<f32>, text: &str) -> Result<f32, String> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "'{text}' is outside {} to {}",
            range.start(),
            range.end()
        ))
    }
}

fn input_gain(text: &str) -> Result<f32, String> {
    let db = parse_gain_db(text).ok_or_else(|| format!("'{text}' is not a gain"))?;
    in_range(db, &INPUT_GAIN_DB, text)
}

fn output_gain(text: &str) -> Result<f32, String> {
    let db = parse_gain_db(text).ok_or_else(|| format!("'{text}' is not a gain"))?;
    in_range(db, &OUTPUT_GAIN_DB, text)
}

fn cutoff(text: &str) -> Result<f32, String> {
    let hz = parse_frequency(text).ok_or_else(|| format!("'{text}' is not a frequency"))?;
    in_range(hz, &CUTOFF_HZ, text)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("Shapeshift v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("failed to load settings")?;

    match args.command {
        Command::Render(render) => run_render(&render, &settings),
        Command::Modes => {
            println!("Modes (--mode, --top, --bottom):");
            for mode in Mode::ALL {
                let order = if mode.clamps_first() {
                    "clamp, then curve"
                } else {
                    "curve, then clamp"
                };
                let label = mode.to_string();
                println!("  {label:<10} {order}");
            }
            println!("Characters (--character):");
            for character in Character::ALL {
                println!("  {character}");
            }
            Ok(())
        }
        Command::Settings { reset } => {
            let settings = if reset {
                let defaults = Settings::default();
                defaults.save().context("failed to save settings")?;
                info!("Settings reset to defaults");
                defaults
            } else {
                settings
            };
            println!("{}", Settings::get_settings_path().display());
            print!("{settings}");
            Ok(())
        }
    }
}

fn run_render(args: &RenderArgs, settings: &Settings) -> Result<()> {
    let params = args.params(settings.params);
    let options = RenderOptions {
        block_size: args.block_size.unwrap_or(settings.audio.block_size) as usize,
        sweep_to_hz: args.sweep_to,
    };

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let dir = args.output_dir.as_deref().unwrap_or(&settings.output_dir);
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory '{dir}'"))?;
            PathBuf::from(dir).join(format!(
                "render_{}.wav",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            ))
        }
    };

    info!("Rendering {} -> {}", args.input.display(), output.display());
    info!("Parameters:\n{params}");

    let report = render_file(&args.input, &output, params, &options)
        .with_context(|| format!("failed to render '{}'", args.input.display()))?;

    info!(
        "Rendered {} frames in {} blocks at {} Hz ({} coefficient updates)",
        report.frames, report.blocks, report.sample_rate, report.coefficient_updates
    );
    println!("{}", output.display());

    Ok(())
}
