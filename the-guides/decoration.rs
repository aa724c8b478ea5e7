//! Marker groups produced from an indentation map.
//!
//! This is a render plan, not a drawing: one [`MarkerGroup`] per line that
//! shows guides, positioned in character cells relative to the line start.
//! Clients read it together with the [`HighlightLayer`] to draw.
//!
//! [`HighlightLayer`]: crate::highlight::HighlightLayer

use std::collections::BTreeMap;

use smallvec::SmallVec;
use tracing::debug;

use crate::{
  block::LineLevels,
  config::GuidesConfig,
  fold::{
    folded_line_spans,
    spans_contain,
  },
  host::GuideHost,
  map::IndentationMap,
  visible::visible_lines,
};

/// Stable identity of a marker: the line it sits on and its 1-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId {
  pub line: usize,
  pub col:  usize,
}

impl MarkerId {
  pub const fn new(line: usize, col: usize) -> Self {
    Self { line, col }
  }
}

/// Presentation shared by every marker of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
  pub thickness:            u16,
  pub active_thickness:     u16,
  pub hover_thickness:      u16,
  /// Extra cells between a marker and the text to its right.
  pub additional_padding:   u16,
  pub fold_on_click:        bool,
  pub highlight_background: bool,
}

impl MarkerStyle {
  pub fn from_config(config: &GuidesConfig) -> Self {
    Self {
      thickness:            config.thickness,
      active_thickness:     config.active_thickness(),
      hover_thickness:      config.hover_thickness(),
      additional_padding:   config.additional_padding,
      fold_on_click:        config.fold_block_on_click,
      highlight_background: config.highlight_active_block_background
        || config.highlight_hovered_block_background,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
  pub id:   MarkerId,
  /// Offset from the line start in character cells.
  pub left: usize,
}

impl Marker {
  /// Padding drawn before the marker. The first column hugs the line start.
  pub fn leading_padding(&self, style: &MarkerStyle) -> u16 {
    if self.id.col == 1 {
      0
    } else {
      style.additional_padding
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGroup {
  pub line:       usize,
  /// Char offset of the line start.
  pub anchor:     usize,
  pub level:      usize,
  pub markers:    SmallVec<[Marker; 4]>,
  pub style:      MarkerStyle,
  /// The group accepts a block background highlight.
  pub background: bool,
}

impl MarkerGroup {
  pub fn marker(&self, col: usize) -> Option<&Marker> {
    self.markers.iter().find(|marker| marker.id.col == col)
  }
}

/// Marker groups keyed by line number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
  groups:     BTreeMap<usize, MarkerGroup>,
  unit_width: usize,
}

impl DecorationSet {
  /// Cells per indentation column.
  pub fn unit_width(&self) -> usize {
    self.unit_width
  }

  pub fn get(&self, line: usize) -> Option<&MarkerGroup> {
    self.groups.get(&line)
  }

  pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
    self.get(id.line)?.marker(id.col)
  }

  pub fn iter(&self) -> impl Iterator<Item = &MarkerGroup> {
    self.groups.values()
  }

  /// Groups on lines `first..=last`.
  pub fn range(&self, first: usize, last: usize) -> impl Iterator<Item = &MarkerGroup> {
    self
      .groups
      .range(first..=last.max(first))
      .map(|(_, group)| group)
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltDecorations {
  pub decorations: DecorationSet,
  pub map:         IndentationMap,
  pub line_levels: LineLevels,
}

/// Resolve the visible lines, measure them and lay out their markers.
pub fn build_decorations<H: GuideHost + ?Sized>(host: &H, config: &GuidesConfig) -> BuiltDecorations {
  let unit = host.indent_unit().max(1);
  let lines = visible_lines(host);
  let map = IndentationMap::new(&lines, host, unit, config.marker_type);
  let folded = folded_line_spans(host);
  let style = MarkerStyle::from_config(config);
  let first_col = if config.hide_first_indent { 2 } else { 1 };

  let mut line_levels = LineLevels::new();
  let mut groups = BTreeMap::new();
  for line in &lines {
    let level = map.level(line.number);
    line_levels.insert(line.number, level);
    if level == 0 {
      continue;
    }

    if line.is_blank() && spans_contain(&folded, line.number) {
      continue;
    }

    let markers = (first_col..=level)
      .map(|col| {
        Marker {
          id:   MarkerId::new(line.number, col),
          left: (col - 1) * unit,
        }
      })
      .collect();
    groups.insert(line.number, MarkerGroup {
      line: line.number,
      anchor: line.from,
      level,
      markers,
      style,
      background: style.highlight_background,
    });
  }

  debug!(
    lines = lines.len(),
    groups = groups.len(),
    unit,
    "built indentation guides"
  );

  BuiltDecorations {
    decorations: DecorationSet {
      groups,
      unit_width: unit,
    },
    map,
    line_levels,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    document::GuideDocument,
    host::GuideHost,
  };

  const PY: &str = "def f():\n  a = 1\n\n  if a:\n    b()\n\nc()\n";

  fn lines_with_groups(built: &BuiltDecorations) -> Vec<usize> {
    built.decorations.iter().map(|group| group.line).collect()
  }

  #[test]
  fn one_marker_per_level() {
    let doc = GuideDocument::new(PY, 2);
    let built = build_decorations(&doc, &GuidesConfig::default());

    assert_eq!(lines_with_groups(&built), vec![2, 3, 4, 5, 6]);
    let group = built.decorations.get(5).unwrap();
    assert_eq!(group.level, 2);
    assert_eq!(group.anchor, doc.line(5).unwrap().from);
    let lefts: Vec<_> = group.markers.iter().map(|marker| marker.left).collect();
    assert_eq!(lefts, vec![0, 2]);
    assert!(group.background);
    assert_eq!(
      built.decorations.marker(MarkerId::new(5, 2)).map(|m| m.left),
      Some(2)
    );
    assert!(built.decorations.marker(MarkerId::new(5, 3)).is_none());
  }

  #[test]
  fn level_zero_lines_are_cached_but_get_no_group() {
    let doc = GuideDocument::new(PY, 2);
    let built = build_decorations(&doc, &GuidesConfig::default());

    assert!(built.decorations.get(1).is_none());
    assert!(built.decorations.get(7).is_none());
    assert!(built.line_levels.contains(7));
    assert_eq!(built.line_levels.get(7), 0);
    assert_eq!(built.line_levels.get(6), 2);
  }

  #[test]
  fn hide_first_indent_drops_column_one() {
    let doc = GuideDocument::new(PY, 2);
    let config = GuidesConfig {
      hide_first_indent: true,
      ..Default::default()
    };
    let built = build_decorations(&doc, &config);

    assert!(built.decorations.get(2).unwrap().markers.is_empty());
    let cols: Vec<_> = built
      .decorations
      .get(5)
      .unwrap()
      .markers
      .iter()
      .map(|marker| marker.id.col)
      .collect();
    assert_eq!(cols, vec![2]);
  }

  #[test]
  fn folded_blank_lines_are_suppressed() {
    let mut doc = GuideDocument::new(PY, 2);
    let header = doc.line(1).unwrap();
    let fold = doc.foldable(header.from, header.to).unwrap();
    doc.fold(fold);

    let built = build_decorations(&doc, &GuidesConfig::default());
    // Line 3 is blank and behind the fold, line 6 is past the fold's end.
    assert!(built.decorations.get(3).is_none());
    assert_eq!(built.line_levels.get(3), 1);
    assert!(built.decorations.get(2).is_some());
    assert!(built.decorations.get(6).is_some());
  }

  #[test]
  fn style_follows_config() {
    let config = GuidesConfig {
      thickness: 2,
      hover_thickness: Some(4),
      additional_padding: 1,
      fold_block_on_click: false,
      highlight_active_block_background: false,
      highlight_hovered_block_background: false,
      ..Default::default()
    };
    let style = MarkerStyle::from_config(&config);
    assert_eq!(style.active_thickness, 2);
    assert_eq!(style.hover_thickness, 4);
    assert!(!style.fold_on_click);
    assert!(!style.highlight_background);

    let first = Marker {
      id:   MarkerId::new(3, 1),
      left: 0,
    };
    let second = Marker {
      id:   MarkerId::new(3, 2),
      left: 4,
    };
    assert_eq!(first.leading_padding(&style), 0);
    assert_eq!(second.leading_padding(&style), 1);
  }

  #[test]
  fn viewport_limits_the_groups() {
    let doc = GuideDocument::new(PY, 2).with_viewport(4, 2);
    let built = build_decorations(&doc, &GuidesConfig::default());
    assert_eq!(lines_with_groups(&built), vec![4, 5]);
    assert_eq!(built.decorations.range(1, 4).count(), 1);
  }
}
