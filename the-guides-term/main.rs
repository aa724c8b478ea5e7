//! Proof-of-life terminal client for the-guides.
//!
//! Loads a file, replays a scripted sequence of cursor, hover and click
//! events through the overlay controller and prints the visible lines with
//! their guides:
//! - `│` plain guide
//! - `┃` guide of the block around the cursor
//! - `╎` guide of the hovered block

mod logging;
mod render;

use std::{
  fs::File,
  io::{
    self,
    BufReader,
  },
  path::PathBuf,
};

use clap::Parser;
use crossterm::terminal;
use eyre::{
  Result,
  WrapErr,
};
use ropey::Rope;
use the_guides::{
  EventDisposition,
  GuideDocument,
  GuideHost,
  GuidesConfig,
  MarkerId,
  OverlayController,
  PointerTarget,
  fold::{
    is_line_blank,
    is_line_folded,
  },
  theme::Mode,
};
use tracing::{
  info,
  warn,
};

use crate::render::Renderer;

#[derive(Debug, Parser)]
#[command(name = "the-guides")]
#[command(about = "Print a file with foldable indentation guides")]
struct Cli {
  /// Path to the file to show
  file: PathBuf,

  /// TOML file with guide settings
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Characters per indentation level
  #[arg(long, default_value_t = 2)]
  indent_unit: usize,

  /// Use the dark color variants
  #[arg(long)]
  dark: bool,

  /// Fold the block headed by LINE before anything else
  #[arg(long, value_name = "LINE")]
  fold: Vec<usize>,

  /// Put the cursor on LINE
  #[arg(long, value_name = "LINE")]
  cursor: Option<usize>,

  /// Hover the guide at LINE:COL
  #[arg(long, value_name = "LINE:COL", value_parser = parse_marker)]
  hover: Option<MarkerId>,

  /// Click the guide at LINE:COL, in order
  #[arg(long, value_name = "LINE:COL", value_parser = parse_marker)]
  click: Vec<MarkerId>,

  /// First line of the viewport
  #[arg(long, default_value_t = 1)]
  top: usize,

  /// Rows in the viewport, defaults to the whole file
  #[arg(long)]
  height: Option<usize>,

  /// More logging on stderr, repeatable
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn parse_marker(value: &str) -> std::result::Result<MarkerId, String> {
  let (line, col) = value
    .split_once(':')
    .ok_or_else(|| format!("expected LINE:COL, got '{value}'"))?;
  let line = line
    .trim()
    .parse()
    .map_err(|err| format!("bad line '{line}': {err}"))?;
  let col = col
    .trim()
    .parse()
    .map_err(|err| format!("bad column '{col}': {err}"))?;
  Ok(MarkerId::new(line, col))
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init(cli.verbose)?;

  let config = match &cli.config {
    Some(path) => GuidesConfig::load(path)?,
    None => GuidesConfig::default(),
  };
  let mode = if cli.dark { Mode::Dark } else { Mode::Light };
  let palette = config.colors.palette_or_default(mode);

  let file = File::open(&cli.file).wrap_err_with(|| format!("failed to open {}", cli.file.display()))?;
  let text = Rope::from_reader(BufReader::new(file))
    .wrap_err_with(|| format!("failed to read {}", cli.file.display()))?;
  let height = cli.height.unwrap_or(usize::MAX);
  let mut doc = GuideDocument::from_rope(text, cli.indent_unit).with_viewport(cli.top, height);
  if let Ok((width, _)) = terminal::size() {
    doc.set_content_width(usize::from(width));
  }

  let mut overlay = OverlayController::new(&doc, config);
  overlay.run_frame();

  apply_folds(&mut doc, &cli.fold);
  sync(&mut overlay, &mut doc);

  if let Some(number) = cli.cursor {
    doc.set_cursor_line(number);
    sync(&mut overlay, &mut doc);
  }

  for id in &cli.click {
    match overlay.pointer_down(&mut doc, PointerTarget::Marker(*id)) {
      EventDisposition::Claimed => info!(line = id.line, col = id.col, "clicked guide"),
      EventDisposition::Ignored => warn!(line = id.line, col = id.col, "no guide to click"),
    }
    sync(&mut overlay, &mut doc);
  }

  if let Some(id) = cli.hover {
    overlay.pointer_move(PointerTarget::Marker(id));
    if overlay.hovered().is_none() {
      warn!(line = id.line, col = id.col, "no guide to hover");
    }
  }

  let mut stdout = io::stdout().lock();
  Renderer::new(palette, mode).render(&mut stdout, &doc, &overlay)
}

/// Fold the block headed by each of `lines`, skipping lines that are blank or
/// already behind a fold.
fn apply_folds(doc: &mut GuideDocument, lines: &[usize]) {
  for &number in lines {
    if is_line_folded(&*doc, number) {
      info!(line = number, "already folded");
      continue;
    }
    if is_line_blank(&*doc, number) {
      warn!(line = number, "blank lines head no fold");
      continue;
    }
    let folded = doc
      .line(number)
      .and_then(|line| doc.foldable(line.from, line.to));
    match folded {
      Some(range) => doc.fold(range),
      None => warn!(line = number, "nothing to fold"),
    }
  }
}

/// Deliver the host's pending changes and flush the deferred pass.
fn sync(overlay: &mut OverlayController, doc: &mut GuideDocument) {
  let update = doc.take_update();
  overlay.update(&*doc, update);
  overlay.run_frame();
}
