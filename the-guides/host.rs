//! The boundary between the guides and the editor that hosts them.
//!
//! The host owns the document, the viewport, the fold state and the cursor.
//! The guides only ever read through [`GuideHost`], except for the fold
//! toggle which asks the host to fold, unfold and scroll.

use std::ops::Range;

use crate::line::Line;

/// A collapsible char interval tracked by the host's fold state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoldRange {
  pub from: usize,
  pub to:   usize,
}

impl FoldRange {
  pub const fn new(from: usize, to: usize) -> Self {
    Self { from, to }
  }

  /// Whether `self` spans all of `other`.
  pub fn covers(&self, other: FoldRange) -> bool {
    self.from <= other.from && self.to >= other.to
  }

  /// Inclusive overlap test, touching intervals intersect.
  pub fn touches(&self, from: usize, to: usize) -> bool {
    self.from <= to && self.to >= from
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
  /// Only scroll when the target is out of view, by the smallest amount.
  #[default]
  Nearest,
  Start,
  Center,
}

/// What changed in the host since the last update tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewUpdate {
  pub doc_changed:       bool,
  pub viewport_changed:  bool,
  pub selection_changed: bool,
}

impl ViewUpdate {
  pub fn is_empty(&self) -> bool {
    !(self.doc_changed || self.viewport_changed || self.selection_changed)
  }

  pub fn merge(&mut self, other: ViewUpdate) {
    self.doc_changed |= other.doc_changed;
    self.viewport_changed |= other.viewport_changed;
    self.selection_changed |= other.selection_changed;
  }
}

/// Queries and commands the guides need from the host editor.
pub trait GuideHost {
  /// Characters per indentation level.
  fn indent_unit(&self) -> usize;

  fn line_count(&self) -> usize;

  /// The line with the given 1-based number, if it exists.
  fn line(&self, number: usize) -> Option<Line>;

  /// The line containing `offset`. Offsets past the end map to the last line.
  fn line_at(&self, offset: usize) -> Line;

  /// Char ranges currently drawn on screen, sorted and excluding folded
  /// interiors.
  fn visible_ranges(&self) -> Vec<Range<usize>>;

  /// Folded ranges touching `[from, to]`.
  fn folded_ranges(&self, from: usize, to: usize) -> Vec<FoldRange>;

  /// A foldable range for the line spanning `[from, to]`.
  fn foldable(&self, from: usize, to: usize) -> Option<FoldRange>;

  fn fold(&mut self, range: FoldRange);

  /// Remove every fold covering `range`, not only one that matches it
  /// exactly.
  ///
  /// Hosts are expected to do this: [`toggle_fold_range`] unfolds whenever
  /// some fold covers the range, so clicking an inner block hidden under a
  /// folded outer block opens the outer one too. A host that only dropped an
  /// exact match would leave the click with no visible effect.
  ///
  /// [`toggle_fold_range`]: crate::fold::toggle_fold_range
  fn unfold(&mut self, range: FoldRange);

  fn scroll_into_view(&mut self, offset: usize, align: ScrollAlign);

  /// Head of the primary selection.
  fn cursor(&self) -> usize;

  /// Width of the content area in character cells.
  fn content_width(&self) -> usize;

  fn cursor_line(&self) -> Line {
    self.line_at(self.cursor())
  }

  /// Char offset of the document end.
  fn doc_end(&self) -> usize {
    self.line(self.line_count()).map_or(0, |line| line.to)
  }
}
