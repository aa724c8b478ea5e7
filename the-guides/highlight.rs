//! Active and hover styling applied on top of a [`DecorationSet`].
//!
//! Each kind is replaced wholesale: callers clear a kind and then mark the
//! markers and backgrounds that belong to it. Ids that are not part of the
//! decoration set are ignored.

use std::collections::{
  BTreeMap,
  HashSet,
};

use crate::decoration::{
  DecorationSet,
  MarkerId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
  Active,
  Hover,
}

/// A block background strip on one line, in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSpan {
  pub left:  usize,
  pub width: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Layer {
  markers:     HashSet<MarkerId>,
  backgrounds: BTreeMap<usize, BackgroundSpan>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightLayer {
  active: Layer,
  hover:  Layer,
}

impl HighlightLayer {
  pub fn new() -> Self {
    Self::default()
  }

  fn layer(&self, kind: HighlightKind) -> &Layer {
    match kind {
      HighlightKind::Active => &self.active,
      HighlightKind::Hover => &self.hover,
    }
  }

  fn layer_mut(&mut self, kind: HighlightKind) -> &mut Layer {
    match kind {
      HighlightKind::Active => &mut self.active,
      HighlightKind::Hover => &mut self.hover,
    }
  }

  pub fn clear(&mut self, kind: HighlightKind) {
    let layer = self.layer_mut(kind);
    layer.markers.clear();
    layer.backgrounds.clear();
  }

  pub fn clear_all(&mut self) {
    self.clear(HighlightKind::Active);
    self.clear(HighlightKind::Hover);
  }

  /// Highlight one marker. Returns false when the marker does not exist.
  pub fn mark(&mut self, decorations: &DecorationSet, id: MarkerId, kind: HighlightKind) -> bool {
    if decorations.marker(id).is_none() {
      return false;
    }
    self.layer_mut(kind).markers.insert(id);
    true
  }

  /// Paint the block background of `line` from column `col` to the right
  /// edge of the content area.
  pub fn background(
    &mut self,
    decorations: &DecorationSet,
    line: usize,
    col: usize,
    kind: HighlightKind,
    content_width: usize,
  ) -> bool {
    let Some(group) = decorations.get(line).filter(|group| group.background) else {
      return false;
    };
    if col == 0 || col > group.level {
      return false;
    }
    // A hidden first column still has a position.
    let left = (col - 1) * decorations.unit_width();

    self.layer_mut(kind).backgrounds.insert(line, BackgroundSpan {
      left,
      width: content_width.saturating_sub(left),
    });
    true
  }

  pub fn is_marked(&self, id: MarkerId, kind: HighlightKind) -> bool {
    self.layer(kind).markers.contains(&id)
  }

  pub fn background_at(&self, line: usize, kind: HighlightKind) -> Option<BackgroundSpan> {
    self.layer(kind).backgrounds.get(&line).copied()
  }

  /// Marked ids of `kind`, sorted by line then column.
  pub fn marked(&self, kind: HighlightKind) -> Vec<MarkerId> {
    let mut ids: Vec<_> = self.layer(kind).markers.iter().copied().collect();
    ids.sort_unstable();
    ids
  }

  pub fn backgrounds(&self, kind: HighlightKind) -> impl Iterator<Item = (usize, BackgroundSpan)> + '_ {
    self
      .layer(kind)
      .backgrounds
      .iter()
      .map(|(&line, &span)| (line, span))
  }

  pub fn is_empty(&self, kind: HighlightKind) -> bool {
    let layer = self.layer(kind);
    layer.markers.is_empty() && layer.backgrounds.is_empty()
  }
}
