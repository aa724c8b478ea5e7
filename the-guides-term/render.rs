//! Draws the document with its guides as plain colored text.

use std::{
  collections::BTreeSet,
  io::Write,
};

use crossterm::{
  queue,
  style::{
    Color,
    Print,
    ResetColor,
    SetBackgroundColor,
    SetForegroundColor,
  },
};
use eyre::Result;
use the_guides::{
  GuideDocument,
  GuideHost,
  MarkerId,
  OverlayController,
  highlight::HighlightKind,
  theme::{
    GuidePalette,
    Mode,
    Rgba,
  },
};

const BASE_GLYPH: char = '│';
const ACTIVE_GLYPH: char = '┃';
const HOVER_GLYPH: char = '╎';
const FOLD_SUFFIX: &str = " …";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
  ch: char,
  fg: Option<Color>,
  bg: Option<Color>,
}

impl Cell {
  fn plain(ch: char) -> Self {
    Self {
      ch,
      fg: None,
      bg: None,
    }
  }
}

pub struct Renderer {
  palette: GuidePalette,
  mode:    Mode,
}

impl Renderer {
  pub fn new(palette: GuidePalette, mode: Mode) -> Self {
    Self { palette, mode }
  }

  pub fn render(
    &self,
    out: &mut impl Write,
    doc: &GuideDocument,
    overlay: &OverlayController,
  ) -> Result<()> {
    let numbers = shown_lines(doc);
    let gutter = numbers.last().map_or(1, |last| last.to_string().len());

    for number in numbers {
      let cells = self.line_cells(doc, overlay, number);
      queue!(out, Print(format!("{number:>gutter$} ")))?;
      for cell in cells {
        match cell.fg {
          Some(fg) => queue!(out, SetForegroundColor(fg))?,
          None => queue!(out, ResetColor)?,
        }
        if let Some(bg) = cell.bg {
          queue!(out, SetBackgroundColor(bg))?;
        }
        queue!(out, Print(cell.ch))?;
        if cell.bg.is_some() {
          queue!(out, ResetColor)?;
        }
      }
      queue!(out, ResetColor)?;
      if header_of_fold(doc, number) {
        queue!(out, Print(FOLD_SUFFIX))?;
      }
      queue!(out, Print("\n"))?;
    }
    out.flush()?;
    Ok(())
  }

  fn line_cells(&self, doc: &GuideDocument, overlay: &OverlayController, number: usize) -> Vec<Cell> {
    let Some(line) = doc.line(number) else {
      return Vec::new();
    };
    let mut cells: Vec<Cell> = expand_tabs(&line.text, doc.indent_unit())
      .chars()
      .map(Cell::plain)
      .collect();

    let highlights = overlay.highlights();
    let background = highlights
      .background_at(number, HighlightKind::Hover)
      .map(|span| (span, self.palette.hover_background))
      .or_else(|| {
        highlights
          .background_at(number, HighlightKind::Active)
          .map(|span| (span, self.palette.background))
      });
    if let Some((span, color)) = background {
      let end = span.left + span.width;
      pad(&mut cells, end);
      let color = self.blend(color);
      for cell in &mut cells[span.left.min(end)..end] {
        cell.bg = Some(color);
      }
    }

    let Some(group) = overlay.decorations().get(number) else {
      return cells;
    };
    for marker in &group.markers {
      pad(&mut cells, marker.left + 1);
      let cell = &mut cells[marker.left];
      if !cell.ch.is_whitespace() {
        continue;
      }
      let (ch, color) = self.glyph(overlay, marker.id);
      cell.ch = ch;
      cell.fg = Some(self.blend(color));
    }
    cells
  }

  fn glyph(&self, overlay: &OverlayController, id: MarkerId) -> (char, Rgba) {
    let highlights = overlay.highlights();
    if highlights.is_marked(id, HighlightKind::Hover) {
      (HOVER_GLYPH, self.palette.hover_marker)
    } else if highlights.is_marked(id, HighlightKind::Active) {
      (ACTIVE_GLYPH, self.palette.active_marker)
    } else {
      (BASE_GLYPH, self.palette.marker)
    }
  }

  /// Composite `color` over the terminal background assumed for the mode.
  fn blend(&self, color: Rgba) -> Color {
    let base: u8 = match self.mode {
      Mode::Light => 0xff,
      Mode::Dark => 0x00,
    };
    let alpha = u16::from(color.a);
    let mix = |channel: u8| {
      let mixed = (u16::from(channel) * alpha + u16::from(base) * (0xff - alpha)) / 0xff;
      u8::try_from(mixed).unwrap_or(u8::MAX)
    };
    Color::Rgb {
      r: mix(color.r),
      g: mix(color.g),
      b: mix(color.b),
    }
  }
}

/// Line numbers on screen: the viewport minus the interiors of folds.
fn shown_lines(doc: &GuideDocument) -> Vec<usize> {
  let mut numbers = BTreeSet::new();
  for range in doc.visible_ranges() {
    let first = doc.line_at(range.start).number;
    let last = doc.line_at(range.end).number;
    numbers.extend(first..=last);
  }
  numbers
    .into_iter()
    .filter(|&number| !doc.is_hidden(number))
    .collect()
}

fn header_of_fold(doc: &GuideDocument, number: usize) -> bool {
  doc
    .folds()
    .iter()
    .any(|fold| doc.line_at(fold.from).number == number)
}

fn expand_tabs(text: &str, tab_size: usize) -> String {
  let tab_size = tab_size.max(1);
  let mut out = String::with_capacity(text.len());
  let mut col = 0;
  for ch in text.chars() {
    if ch == '\t' {
      let width = tab_size - col % tab_size;
      out.extend(std::iter::repeat_n(' ', width));
      col += width;
    } else {
      out.push(ch);
      col += 1;
    }
  }
  out
}

fn pad(cells: &mut Vec<Cell>, len: usize) {
  if cells.len() < len {
    cells.resize(len, Cell::plain(' '));
  }
}
