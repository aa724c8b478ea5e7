//! Which lines the guides have to look at.
//!
//! The visible ranges reported by the host skip folded interiors, but the
//! lines hidden behind a fold placeholder still need a level so that active
//! and hovered blocks can extend across them. Folded ranges that intersect
//! the visible window are therefore walked as well.

use std::collections::BTreeMap;

use crate::{
  host::{
    FoldRange,
    GuideHost,
  },
  line::Line,
};

/// Folded ranges that start, end, or fully contain one of the visible ranges.
///
/// Folds merely lying between the first and last visible offset are left out;
/// they belong to an outer fold that is itself included.
pub fn visible_folded_ranges<H: GuideHost + ?Sized>(host: &H) -> Vec<FoldRange> {
  let visible = host.visible_ranges();
  let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
    return Vec::new();
  };

  host
    .folded_ranges(first.start, last.end)
    .into_iter()
    .filter(|fold| {
      visible.iter().any(|range| {
        (fold.from >= range.start && fold.from <= range.end)
          || (fold.to >= range.start && fold.to <= range.end)
          || (fold.from <= range.start && fold.to >= range.end)
      })
    })
    .collect()
}

/// Lines touched by the visible ranges and the folds intersecting them,
/// ascending and without duplicates.
pub fn visible_lines<H: GuideHost + ?Sized>(host: &H) -> Vec<Line> {
  let mut ranges: Vec<(usize, usize)> = host
    .visible_ranges()
    .into_iter()
    .map(|range| (range.start, range.end))
    .chain(
      visible_folded_ranges(host)
        .into_iter()
        .map(|fold| (fold.from, fold.to)),
    )
    .collect();
  ranges.sort_unstable_by_key(|&(from, _)| from);

  let mut lines = BTreeMap::new();
  for (from, to) in ranges {
    walk_lines(host, from, to, &mut lines);
  }
  lines.into_values().collect()
}

/// Every line of the document.
pub fn all_lines<H: GuideHost + ?Sized>(host: &H) -> Vec<Line> {
  (1..=host.line_count())
    .filter_map(|number| host.line(number))
    .collect()
}

fn walk_lines<H: GuideHost + ?Sized>(
  host: &H,
  from: usize,
  to: usize,
  lines: &mut BTreeMap<usize, Line>,
) {
  let mut pos = from;
  while pos <= to {
    let line = host.line_at(pos);
    let next = line.to + 1;
    lines.insert(line.number, line);
    // `line_at` clamps past the document end; stop instead of spinning.
    if next <= pos {
      break;
    }
    pos = next;
  }
}
