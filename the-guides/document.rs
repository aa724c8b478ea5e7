//! A rope-backed [`GuideHost`].
//!
//! `GuideDocument` is the reference host used by the tests and the terminal
//! client. It keeps just enough editor state for the guides to work against:
//! text, indent unit, folds, a line-based viewport, the cursor and the content
//! width. Every mutation records what changed; [`GuideDocument::take_update`]
//! drains it as a [`ViewUpdate`], the way an editor delivers one update tick
//! per transaction.
//!
//! Folding is indentation based: a line is foldable when the next non-blank
//! lines are indented deeper than it. The fold runs from the end of the
//! header line to the end of the last deeper line, so trailing blank lines
//! stay visible.
//!
//! # Example
//!
//! ```
//! use the_guides::{
//!   GuideDocument,
//!   GuideHost,
//! };
//!
//! let doc = GuideDocument::new("if x:\n  y()\n  z()\n", 2);
//! let header = doc.line(1).unwrap();
//! let range = doc.foldable(header.from, header.to).unwrap();
//! assert_eq!((range.from, range.to), (5, 17));
//! ```

use std::{
  mem,
  ops::Range,
};

use ropey::Rope;
use thiserror::Error;

use crate::{
  host::{
    FoldRange,
    GuideHost,
    ScrollAlign,
    ViewUpdate,
  },
  line::Line,
  map::num_columns,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
  #[error("edit range {start}..{end} is outside the document (length {len})")]
  OutOfBounds { start: usize, end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Clone)]
pub struct GuideDocument {
  text:          Rope,
  indent_unit:   usize,
  /// Sorted by `from`.
  folds:         Vec<FoldRange>,
  top_line:      usize,
  /// Visual rows on screen. A folded block takes a single row.
  height:        usize,
  cursor:        usize,
  content_width: usize,
  last_scroll:   Option<(usize, ScrollAlign)>,
  pending:       ViewUpdate,
}

impl GuideDocument {
  pub fn new(text: &str, indent_unit: usize) -> Self {
    Self::from_rope(Rope::from_str(text), indent_unit)
  }

  pub fn from_rope(text: Rope, indent_unit: usize) -> Self {
    Self {
      text,
      indent_unit: indent_unit.max(1),
      folds: Vec::new(),
      top_line: 1,
      height: usize::MAX,
      cursor: 0,
      content_width: 80,
      last_scroll: None,
      pending: ViewUpdate::default(),
    }
  }

  pub fn with_viewport(mut self, top_line: usize, height: usize) -> Self {
    self.top_line = top_line.max(1);
    self.height = height;
    self
  }

  pub fn text(&self) -> &Rope {
    &self.text
  }

  pub fn folds(&self) -> &[FoldRange] {
    &self.folds
  }

  pub fn top_line(&self) -> usize {
    self.top_line
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn last_scroll(&self) -> Option<(usize, ScrollAlign)> {
    self.last_scroll
  }

  /// Drain the changes recorded since the last call.
  pub fn take_update(&mut self) -> ViewUpdate {
    mem::take(&mut self.pending)
  }

  pub fn set_indent_unit(&mut self, indent_unit: usize) {
    // The unit lives in editor state, not in the viewport or the document; the
    // guides notice the change by polling `indent_unit` on the next update.
    self.indent_unit = indent_unit.max(1);
  }

  pub fn set_cursor(&mut self, offset: usize) {
    let offset = offset.min(self.text.len_chars());
    if offset != self.cursor {
      self.cursor = offset;
      self.pending.selection_changed = true;
    }
  }

  /// Put the cursor at the start of line `number`.
  pub fn set_cursor_line(&mut self, number: usize) {
    if let Some(line) = self.line(number) {
      self.set_cursor(line.from);
    }
  }

  pub fn set_viewport(&mut self, top_line: usize, height: usize) {
    let top_line = top_line.max(1);
    if (top_line, height) != (self.top_line, self.height) {
      self.top_line = top_line;
      self.height = height;
      self.pending.viewport_changed = true;
    }
  }

  pub fn set_content_width(&mut self, width: usize) {
    self.content_width = width;
  }

  /// Replace the chars in `range` with `insert`.
  ///
  /// Folds touched by the edit are dropped, later folds and the cursor are
  /// shifted.
  pub fn replace(&mut self, range: Range<usize>, insert: &str) -> Result<()> {
    let len = self.text.len_chars();
    if range.start > range.end || range.end > len {
      return Err(DocumentError::OutOfBounds {
        start: range.start,
        end: range.end,
        len,
      });
    }

    self.text.remove(range.clone());
    self.text.insert(range.start, insert);

    let inserted = insert.chars().count();
    let shift = |pos: usize| pos - (range.end - range.start) + inserted;

    self.folds.retain(|fold| !fold.touches(range.start, range.end));
    for fold in &mut self.folds {
      if fold.from >= range.end {
        fold.from = shift(fold.from);
        fold.to = shift(fold.to);
      }
    }

    if self.cursor >= range.end {
      self.cursor = shift(self.cursor);
    } else if self.cursor > range.start {
      self.cursor = range.start + inserted;
    }

    self.pending.doc_changed = true;
    self.pending.selection_changed = true;
    Ok(())
  }

  /// Lines hidden behind a fold placeholder. The fold header stays visible.
  pub fn is_hidden(&self, number: usize) -> bool {
    self.folds.iter().any(|fold| {
      let header = self.line_at(fold.from).number;
      let last = self.line_at(fold.to).number;
      number > header && number <= last
    })
  }

  fn line_text(&self, index: usize) -> String {
    let mut text = String::from(self.text.line(index));
    while text.ends_with(['\n', '\r']) {
      text.pop();
    }
    text
  }

  /// The widest fold starting inside `[from, to]`.
  fn fold_starting_in(&self, from: usize, to: usize) -> Option<FoldRange> {
    self
      .folds
      .iter()
      .filter(|fold| fold.from >= from && fold.from <= to && fold.to > fold.from)
      .max_by_key(|fold| fold.to)
      .copied()
  }
}

impl GuideHost for GuideDocument {
  fn indent_unit(&self) -> usize {
    self.indent_unit
  }

  fn line_count(&self) -> usize {
    self.text.len_lines()
  }

  fn line(&self, number: usize) -> Option<Line> {
    if number == 0 || number > self.text.len_lines() {
      return None;
    }
    let index = number - 1;
    let from = self.text.line_to_char(index);
    Some(Line::new(number, from, self.line_text(index)))
  }

  fn line_at(&self, offset: usize) -> Line {
    let offset = offset.min(self.text.len_chars());
    let index = self.text.char_to_line(offset);
    let from = self.text.line_to_char(index);
    Line::new(index + 1, from, self.line_text(index))
  }

  fn visible_ranges(&self) -> Vec<Range<usize>> {
    let count = self.line_count();
    let mut ranges = Vec::new();
    let mut number = self.top_line.min(count);
    let Some(first) = self.line(number) else {
      return ranges;
    };

    let mut start = first.from;
    let mut end = first.from;
    let mut rows = 0;
    while rows < self.height {
      let Some(mut line) = self.line(number) else {
        break;
      };
      let mut scan_from = line.from;
      while let Some(fold) = self.fold_starting_in(scan_from, line.to) {
        ranges.push(start..fold.from);
        start = fold.to;
        scan_from = fold.to;
        line = self.line_at(fold.to);
      }
      end = line.to;
      number = line.number + 1;
      rows += 1;
    }
    ranges.push(start..end.max(start));
    ranges
  }

  fn folded_ranges(&self, from: usize, to: usize) -> Vec<FoldRange> {
    self
      .folds
      .iter()
      .filter(|fold| fold.touches(from, to))
      .copied()
      .collect()
  }

  fn foldable(&self, from: usize, _to: usize) -> Option<FoldRange> {
    let header = self.line_at(from);
    if header.is_blank() {
      return None;
    }
    let indent = num_columns(&header.text, self.indent_unit);

    let mut last = None;
    for number in header.number + 1..=self.line_count() {
      let Some(line) = self.line(number) else {
        break;
      };
      if line.is_blank() {
        continue;
      }
      if num_columns(&line.text, self.indent_unit) <= indent {
        break;
      }
      last = Some(line);
    }

    last.map(|last| FoldRange::new(header.to, last.to))
  }

  fn fold(&mut self, range: FoldRange) {
    if self.folds.contains(&range) {
      return;
    }
    let index = self.folds.partition_point(|fold| fold < &range);
    self.folds.insert(index, range);
    self.pending.viewport_changed = true;
  }

  fn unfold(&mut self, range: FoldRange) {
    let before = self.folds.len();
    self.folds.retain(|fold| !fold.covers(range));
    if self.folds.len() != before {
      self.pending.viewport_changed = true;
    }
  }

  fn scroll_into_view(&mut self, offset: usize, align: ScrollAlign) {
    self.last_scroll = Some((offset, align));
    let number = self.line_at(offset).number;
    let height = self.height.max(1);
    let bottom = self.top_line.saturating_add(height - 1);
    let top = match align {
      ScrollAlign::Nearest if number < self.top_line => number,
      ScrollAlign::Nearest if number > bottom => number + 1 - height,
      ScrollAlign::Nearest => self.top_line,
      ScrollAlign::Start => number,
      ScrollAlign::Center => number.saturating_sub(height / 2).max(1),
    };
    if top != self.top_line {
      self.top_line = top;
      self.pending.viewport_changed = true;
    }
  }

  fn cursor(&self) -> usize {
    self.cursor
  }

  fn content_width(&self) -> usize {
    self.content_width
  }
}
