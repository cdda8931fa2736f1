//! blockmail CLI - block-based email composer

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use blockmail::render::{inspect_layout, Placeholder};
use blockmail::{
    parse_file, parse_file_with_options, Alignment, BlockKind, Composition, CompositionStore,
    Direction, FileLayout, FileStore, HtmlRenderer, JsonFormat, LayoutSource, ParseOptions,
    RenderOptions, SizeLevel, StaticLayout, StyleField,
};

#[derive(Parser)]
#[command(name = "blockmail")]
#[command(version)]
#[command(about = "Compose block-based emails and render them to HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default composition as JSON
    New {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a composition into an HTML layout
    Render {
        /// Composition JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Layout template (built-in layout if not specified)
        #[arg(long, value_name = "FILE", env = "BLOCKMAIL_LAYOUT")]
        layout: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Reject layouts missing a placeholder
        #[arg(long)]
        strict: bool,

        /// Skip malformed blocks instead of failing
        #[arg(long)]
        lenient: bool,

        /// Prefix for root-relative asset references
        #[arg(long, value_name = "URL")]
        asset_base: Option<String>,
    },

    /// Show blocks and style of a composition
    Info {
        /// Composition JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Move a block one step up or down
    Move {
        /// Composition JSON file (rewritten in place)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Zero-based position of the block
        index: usize,

        /// Direction of the move
        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// Replace the content of a block
    SetContent {
        /// Composition JSON file (rewritten in place)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Block id
        id: u32,

        /// New content; an empty string clears it
        value: String,
    },

    /// Set one style field
    SetStyle {
        /// Composition JSON file (rewritten in place)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Field name (titleSize, contentSize, alignment, theme, backgroundColor, backgroundImage)
        field: String,

        /// New value; size and alignment names like `large` or `center` are expanded
        value: String,
    },

    /// Append a block
    Add {
        /// Composition JSON file (rewritten in place)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Block kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Initial content
        value: Option<String>,
    },

    /// Remove a block by id
    Remove {
        /// Composition JSON file (rewritten in place)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Block id
        id: u32,
    },

    /// Save a composition into a store directory
    Save {
        /// Composition JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Store directory
        #[arg(long, value_name = "DIR", env = "BLOCKMAIL_STORE")]
        store: PathBuf,

        /// Overwrite the record with this id
        #[arg(long)]
        id: Option<String>,

        /// Human-readable name
        #[arg(long)]
        name: Option<String>,
    },

    /// Load a stored composition
    Load {
        /// Composition id
        id: String,

        /// Store directory
        #[arg(long, value_name = "DIR", env = "BLOCKMAIL_STORE")]
        store: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List stored compositions
    #[command(alias = "ls")]
    List {
        /// Store directory
        #[arg(long, value_name = "DIR", env = "BLOCKMAIL_STORE")]
        store: PathBuf,
    },

    /// Check that a layout contains each placeholder once
    LayoutCheck {
        /// Layout template
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Title,
    Content,
    Image,
}

impl From<KindArg> for BlockKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Title => BlockKind::Title,
            KindArg::Content => BlockKind::Content,
            KindArg::Image => BlockKind::Image,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New { output } => cmd_new(output.as_deref()),
        Commands::Render {
            input,
            layout,
            output,
            strict,
            lenient,
            asset_base,
        } => cmd_render(
            &input,
            layout.as_deref(),
            output.as_deref(),
            strict,
            lenient,
            asset_base,
        ),
        Commands::Info { input } => cmd_info(&input),
        Commands::Move {
            input,
            index,
            direction,
        } => cmd_move(&input, index, direction.into()),
        Commands::SetContent { input, id, value } => cmd_set_content(&input, id, value),
        Commands::SetStyle {
            input,
            field,
            value,
        } => cmd_set_style(&input, &field, &value),
        Commands::Add { input, kind, value } => cmd_add(&input, kind.into(), value),
        Commands::Remove { input, id } => cmd_remove(&input, id),
        Commands::Save {
            input,
            store,
            id,
            name,
        } => cmd_save(&input, &store, id.as_deref(), name.as_deref()),
        Commands::Load { id, store, output } => cmd_load(&id, &store, output.as_deref()),
        Commands::List { store } => cmd_list(&store),
        Commands::LayoutCheck { input } => cmd_layout_check(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }
    Ok(())
}

fn write_composition(path: &Path, composition: &Composition) -> Result<(), Box<dyn std::error::Error>> {
    let json = blockmail::render::to_json(composition, JsonFormat::Pretty)?;
    fs::write(path, json)?;
    Ok(())
}

fn cmd_new(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = blockmail::render::to_json(&Composition::create_default(), JsonFormat::Pretty)?;
    write_output(output, &json)
}

fn cmd_render(
    input: &Path,
    layout: Option<&Path>,
    output: Option<&Path>,
    strict: bool,
    lenient: bool,
    asset_base: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut parse_options = ParseOptions::new();
    if lenient {
        parse_options = parse_options.lenient();
    }
    let composition = parse_file_with_options(input, parse_options)?;

    let source: Box<dyn LayoutSource> = match layout {
        Some(path) => Box::new(FileLayout::new(path)),
        None => Box::new(StaticLayout::default()),
    };
    let template = source.load()?;

    let mut options = RenderOptions::new().with_strict_layout(strict);
    if let Some(base) = asset_base {
        options = options.with_asset_base_url(base);
    }

    let doc = HtmlRenderer::new(options).render_document(&template, &composition, None)?;
    log::info!(
        "rendered {} fragments ({} empty images)",
        doc.stats.fragment_count(),
        doc.stats.empty_image_count
    );

    write_output(output, &doc.html)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let composition = parse_file(input)?;

    println!("{}", "Blocks".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if composition.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for block in composition.sorted_blocks() {
        let preview = if block.has_content() {
            preview(block.text(), 48)
        } else {
            "(empty)".dimmed().to_string()
        };
        println!(
            "{:>3}  {:<8} {}  {}",
            block.order,
            block.kind.as_str().bold(),
            format!("#{}", block.id).dimmed(),
            preview
        );
    }

    println!();
    println!("{}", "Style".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for field in StyleField::ALL {
        let value = composition.style.get(field).unwrap_or("-");
        println!("{}: {}", field.name().bold(), value);
    }

    Ok(())
}

fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

fn cmd_move(input: &Path, index: usize, direction: Direction) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;

    if composition.move_block(index, direction) {
        write_composition(input, &composition)?;
        println!("{} block at {} {:?}", "Moved".green(), index, direction);
    } else {
        println!("{}", "Block is already at the edge, nothing moved".yellow());
    }

    Ok(())
}

fn cmd_set_content(input: &Path, id: u32, value: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;

    let content = if value.is_empty() { None } else { Some(value) };
    composition.set_block_content(id, content)?;
    write_composition(input, &composition)?;

    println!("{} block #{}", "Updated".green(), id);
    Ok(())
}

/// Expand size and alignment shorthands to their class tokens.
fn style_value(field: StyleField, value: &str) -> String {
    match field {
        StyleField::TitleSize | StyleField::ContentSize => value
            .parse::<SizeLevel>()
            .map(|level| level.token().to_string())
            .unwrap_or_else(|_| value.to_string()),
        StyleField::Alignment => value
            .parse::<Alignment>()
            .map(|alignment| alignment.token().to_string())
            .unwrap_or_else(|_| value.to_string()),
        _ => value.to_string(),
    }
}

fn cmd_set_style(input: &Path, field: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;

    let field: StyleField = field.parse()?;
    let value = style_value(field, value);
    composition.style.set(field, value.as_str());
    write_composition(input, &composition)?;

    println!("{} {} = {}", "Set".green(), field, value);
    Ok(())
}

fn cmd_add(input: &Path, kind: BlockKind, value: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;

    let id = composition.push_block(kind, value);
    write_composition(input, &composition)?;

    println!("{} {} block #{}", "Added".green(), kind, id);
    Ok(())
}

fn cmd_remove(input: &Path, id: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;

    let removed = composition.remove_block(id)?;
    write_composition(input, &composition)?;

    println!("{} {} block #{}", "Removed".green(), removed.kind, id);
    Ok(())
}

fn cmd_save(
    input: &Path,
    store_dir: &Path,
    id: Option<&str>,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut composition = parse_file(input)?;
    composition.normalize_order();

    let store = FileStore::new(store_dir);
    let id = store.save_named(&composition, id, name)?;

    println!("{} {}", "Saved as".green(), id.bold());
    Ok(())
}

fn cmd_load(id: &str, store_dir: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(store_dir);
    let composition = store.load(id)?;

    let json = blockmail::render::to_json(&composition, JsonFormat::Pretty)?;
    write_output(output, &json)
}

fn cmd_list(store_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(store_dir);
    let summaries = store.list()?;

    if summaries.is_empty() {
        println!("{}", "No stored compositions".yellow());
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "{}  {:<24} {:>2} blocks  {}",
            summary.id.bold(),
            summary.name.as_deref().unwrap_or("-"),
            summary.block_count,
            summary
                .updated_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .dimmed()
        );
    }
    println!("\n{} {} compositions", "Total:".green().bold(), summaries.len());

    Ok(())
}

fn cmd_layout_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let layout = FileLayout::new(input).load()?;
    let report = inspect_layout(&layout);

    println!("{}", "Placeholders".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for placeholder in Placeholder::ALL {
        let count = report.count(placeholder);
        let mark = match count {
            1 => "ok".green(),
            0 => "missing".red(),
            _ => "repeated".yellow(),
        };
        println!("{:<22} {:>2}  {}", placeholder.token(), count, mark);
    }

    if !report.unknown.is_empty() {
        println!();
        println!("{}: {}", "Unknown tokens".yellow(), report.unknown.join(", "));
    }

    if report.is_complete() {
        println!("\n{}", "Layout is complete".green().bold());
        Ok(())
    } else {
        Err(format!("layout {} is incomplete", input.display()).into())
    }
}

fn cmd_version() {
    println!("{} {}", "blockmail".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Block-based email composer");
    println!();
    println!("License: MIT");
}
