use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cardwright::{CardConfig, CardType, GearworkCard, MagickRenderer, pipeline_args};

#[derive(Parser, Debug)]
#[command(name = "cardwright", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a single title card (requires ImageMagick on PATH).
    Create(CardArgs),
    /// Print the assembled ImageMagick invocation without running it.
    Plan(CardArgs),
    /// Build every card described in a JSON batch file.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct CardArgs {
    /// Source image.
    #[arg(long)]
    source: PathBuf,

    /// Output card path.
    #[arg(long)]
    out: PathBuf,

    /// Title text; embed newlines for multi-line titles.
    #[arg(long)]
    title: String,

    /// Season text; omitted means no season line.
    #[arg(long)]
    season: Option<String>,

    /// Episode text; omitted means no episode line.
    #[arg(long)]
    episode: Option<String>,

    /// Title font file override.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Title fill color override.
    #[arg(long)]
    font_color: Option<String>,

    /// Title size multiplier.
    #[arg(long, default_value_t = 1.0)]
    font_size: f64,

    /// Extra interline spacing for multi-line titles.
    #[arg(long, default_value_t = 0)]
    interline_spacing: i32,

    /// Vertical shift of the title block, in pixels.
    #[arg(long, default_value_t = 0)]
    vertical_shift: i32,

    /// Fill color of the season/episode line.
    #[arg(long)]
    episode_text_color: Option<String>,

    /// Blur the source image.
    #[arg(long)]
    blur: bool,

    /// Render the source image in grayscale.
    #[arg(long)]
    grayscale: bool,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON file holding an array of card configs.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Create(args) => cmd_create(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

impl CardArgs {
    fn into_config(self) -> CardConfig {
        CardConfig {
            source_file: self.source,
            output_file: self.out,
            hide_season_text: self.season.is_none(),
            hide_episode_text: self.episode.is_none(),
            title_text: self.title,
            season_text: self.season.unwrap_or_default(),
            episode_text: self.episode.unwrap_or_default(),
            font_file: self.font,
            font_color: self.font_color,
            font_size: self.font_size,
            font_interline_spacing: self.interline_spacing,
            font_vertical_shift: self.vertical_shift,
            episode_text_color: self.episode_text_color,
            blur: self.blur,
            grayscale: self.grayscale,
        }
    }
}

fn cmd_create(args: CardArgs) -> anyhow::Result<()> {
    let card = GearworkCard::new(args.into_config())?;
    let renderer = MagickRenderer::new();
    card.build(&renderer)?;
    eprintln!("wrote {}", card.output_file().display());
    Ok(())
}

fn cmd_plan(args: CardArgs) -> anyhow::Result<()> {
    let card = GearworkCard::new(args.into_config())?;
    let renderer = MagickRenderer::new();
    let ops = card.build_operations(&renderer)?;
    println!("magick {}", pipeline_args(&ops).join(" "));
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let configs = read_batch_json(&args.in_path)?;
    let renderer = MagickRenderer::new();

    let mut failures = 0usize;
    for config in configs {
        let output_file = config.output_file.clone();
        match GearworkCard::new(config).and_then(|card| card.build(&renderer)) {
            Ok(()) => eprintln!("wrote {}", output_file.display()),
            Err(err) => {
                failures += 1;
                eprintln!("failed {}: {err}", output_file.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} card(s) failed");
    }
    Ok(())
}

fn read_batch_json(path: &Path) -> anyhow::Result<Vec<CardConfig>> {
    let f = File::open(path).with_context(|| format!("open batch file '{}'", path.display()))?;
    let r = BufReader::new(f);
    let configs: Vec<CardConfig> =
        serde_json::from_reader(r).with_context(|| "parse batch JSON")?;
    Ok(configs)
}
