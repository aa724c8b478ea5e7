//! Indentation levels for a set of lines.
//!
//! A non-blank line's level is its leading column count divided by the indent
//! unit. Blank lines have no indentation of their own and borrow a level from
//! the closest non-blank lines around them, so guides run through the gaps
//! inside a block:
//!
//! ```text
//! def f():        0
//!   a = 1         1
//!                 1   <- inherits from `a = 1`
//!   if a:         1
//!     b()         2
//!                 ?   <- full-scope: 2, code-only: 1
//! c()             0
//! ```
//!
//! Lines outside the requested set are read from the host on demand while
//! looking for those neighbours and are kept in the map.

use std::collections::BTreeMap;

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  host::GuideHost,
  line::Line,
};

/// How far guides extend past the last line of code in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerType {
  /// Guides continue through trailing blank lines of a block.
  #[default]
  FullScope,
  /// Guides stop at the last genuine code line.
  CodeOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentEntry {
  pub line:  Line,
  /// Leading visible columns. Always 0 for blank lines.
  pub col:   usize,
  pub level: usize,
  pub empty: bool,
}

/// A line of an active block, tagged with the column it is active at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLine {
  pub number: usize,
  pub active: usize,
}

#[derive(Debug, Clone, Copy)]
struct Neighbour {
  level: usize,
  empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
  Backward,
  Forward,
}

#[derive(Debug, Clone, Default)]
pub struct IndentationMap {
  entries:     BTreeMap<usize, IndentEntry>,
  unit_width:  usize,
  marker_type: MarkerType,
}

impl IndentationMap {
  pub fn new<H: GuideHost + ?Sized>(
    lines: &[Line],
    host: &H,
    unit_width: usize,
    marker_type: MarkerType,
  ) -> Self {
    let mut builder = Builder {
      host,
      entries: BTreeMap::new(),
      unit_width: unit_width.max(1),
      marker_type,
      line_count: host.line_count(),
    };
    for line in lines {
      builder.add(line);
    }

    Self {
      entries: builder.entries,
      unit_width: builder.unit_width,
      marker_type,
    }
  }

  pub fn get(&self, number: usize) -> Option<&IndentEntry> {
    self.entries.get(&number)
  }

  pub fn contains(&self, number: usize) -> bool {
    self.entries.contains_key(&number)
  }

  /// Level of a mapped line, 0 when the line is unknown.
  pub fn level(&self, number: usize) -> usize {
    self.get(number).map_or(0, |entry| entry.level)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &IndentEntry> {
    self.entries.values()
  }

  pub fn unit_width(&self) -> usize {
    self.unit_width
  }

  pub fn marker_type(&self) -> MarkerType {
    self.marker_type
  }

  /// Lines of the block that `number` belongs to, ascending.
  ///
  /// A line that opens a block (the next line is deeper) or closes one (the
  /// previous line is deeper) counts as part of the deeper block. Returns
  /// `None` when the line is not mapped or sits at level 0.
  pub fn active_lines(&self, number: usize) -> Option<Vec<ActiveLine>> {
    let mut current = self.get(number)?;
    if let Some(next) = self.get(current.line.number + 1) {
      if next.level > current.level {
        current = next;
      }
    }
    if let Some(prev) = current
      .line
      .number
      .checked_sub(1)
      .and_then(|number| self.get(number))
    {
      if prev.level > current.level {
        current = prev;
      }
    }
    if current.level == 0 {
      return None;
    }

    let column = current.level;
    let origin = current.line.number;
    let active = |entry: &IndentEntry| {
      ActiveLine {
        number: entry.line.number,
        active: column,
      }
    };

    let mut lines: Vec<ActiveLine> = self
      .entries
      .range(..origin)
      .rev()
      .map(|(_, entry)| entry)
      .take_while(|entry| entry.level >= column)
      .map(active)
      .collect();
    lines.reverse();
    lines.push(ActiveLine {
      number: origin,
      active: column,
    });
    lines.extend(
      self
        .entries
        .range(origin + 1..)
        .map(|(_, entry)| entry)
        .take_while(|entry| entry.level >= column)
        .map(active),
    );
    Some(lines)
  }
}

struct Builder<'a, H: ?Sized> {
  host:        &'a H,
  entries:     BTreeMap<usize, IndentEntry>,
  unit_width:  usize,
  marker_type: MarkerType,
  line_count:  usize,
}

impl<H: GuideHost + ?Sized> Builder<'_, H> {
  fn add(&mut self, line: &Line) -> Neighbour {
    if let Some(entry) = self.entries.get(&line.number) {
      return Neighbour {
        level: entry.level,
        empty: entry.empty,
      };
    }

    if !line.is_blank() {
      return self.measure(line.clone());
    }

    // A blank first line has nothing above it to continue from.
    if line.number == 1 {
      return self.set(line.clone(), 0, 0);
    }
    // The empty line after the final line break closes every block.
    if line.number == self.line_count && line.text.is_empty() {
      return self.set(line.clone(), 0, 0);
    }
    // Any other blank last line continues the block above it.
    if line.number == self.line_count {
      let prev = self.closest_non_empty(line.number, Direction::Backward);
      return self.set(line.clone(), 0, prev.level);
    }

    let prev = self.closest_non_empty(line.number, Direction::Backward);
    let next = self.closest_non_empty(line.number, Direction::Forward);

    let level = if prev.level >= next.level && self.marker_type != MarkerType::CodeOnly {
      prev.level
    } else if prev.empty && prev.level == 0 && next.level != 0 {
      // A guide starting on a blank line looks detached.
      0
    } else if next.level > prev.level {
      // Only step one level in, never propagate a deep level backwards.
      prev.level + 1
    } else {
      next.level
    };
    self.set(line.clone(), 0, level)
  }

  fn closest_non_empty(&mut self, from: usize, direction: Direction) -> Neighbour {
    let line_count = self.line_count;
    let step = |number: usize| {
      match direction {
        Direction::Backward => number.checked_sub(1).filter(|&number| number >= 1),
        Direction::Forward => Some(number + 1).filter(|&number| number <= line_count),
      }
    };

    let mut cursor = step(from);
    while let Some(number) = cursor {
      if let Some(entry) = self.entries.get(&number) {
        if !entry.empty {
          return Neighbour {
            level: entry.level,
            empty: false,
          };
        }
      } else if let Some(line) = self.host.line(number) {
        if !line.is_blank() {
          return self.measure(line);
        }
      }
      cursor = step(number);
    }

    // Ran into the document edge through blank lines only.
    let edge = match direction {
      Direction::Backward => 1,
      Direction::Forward => self.line_count,
    };
    let level = match self.entries.get(&edge) {
      Some(entry) => entry.level,
      None => {
        match self.host.line(edge) {
          Some(line) => self.add(&line).level,
          None => 0,
        }
      },
    };
    Neighbour { level, empty: true }
  }

  fn measure(&mut self, line: Line) -> Neighbour {
    let col = num_columns(&line.text, self.unit_width);
    let level = col / self.unit_width;
    self.set(line, col, level)
  }

  fn set(&mut self, line: Line, col: usize, level: usize) -> Neighbour {
    let empty = line.is_blank();
    self.entries.insert(line.number, IndentEntry {
      line,
      col,
      level,
      empty,
    });
    Neighbour { level, empty }
  }
}

/// Visible columns of leading whitespace.
///
/// Spaces and no-break spaces take one column, a tab advances to the next
/// multiple of `tab_size`, carriage returns take none. The scan stops at the
/// first other character.
pub fn num_columns(text: &str, tab_size: usize) -> usize {
  let tab_size = tab_size.max(1);
  let mut col = 0;
  for ch in text.chars() {
    match ch {
      ' ' | '\u{00A0}' => col += 1,
      '\t' => col += tab_size - col % tab_size,
      '\r' => {},
      _ => break,
    }
  }
  col
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    document::GuideDocument,
    visible::all_lines,
  };

  const PY: &str = "def f():\n  a = 1\n\n  if a:\n    b()\n\nc()\n";

  fn levels(text: &str, unit: usize, marker_type: MarkerType) -> Vec<usize> {
    let doc = GuideDocument::new(text, unit);
    let lines = all_lines(&doc);
    let map = IndentationMap::new(&lines, &doc, unit, marker_type);
    lines.iter().map(|line| map.level(line.number)).collect()
  }

  #[test]
  fn tabs_stop_at_unit_multiples() {
    assert_eq!(num_columns("\tx", 4), 4);
    assert_eq!(num_columns("\t\tx", 4), 8);
    assert_eq!(num_columns(" \tx", 4), 4);
    assert_eq!(num_columns("   \tx", 4), 4);
    assert_eq!(num_columns("    \tx", 4), 8);
    assert_eq!(num_columns("  \t", 2), 4);
  }

  #[test]
  fn columns_count_spaces_and_skip_carriage_returns() {
    assert_eq!(num_columns("", 2), 0);
    assert_eq!(num_columns("x  ", 2), 0);
    assert_eq!(num_columns("  \u{a0}x", 2), 3);
    assert_eq!(num_columns(" \r x", 2), 2);
    assert_eq!(num_columns("\u{2003}x", 2), 0);
  }

  #[test]
  fn simple_block() {
    assert_eq!(levels("if x:\n  y()\n  z()\n", 2, MarkerType::FullScope), vec![
      0, 1, 1, 0
    ]);
  }

  #[test]
  fn blank_lines_inherit_from_context() {
    assert_eq!(levels(PY, 2, MarkerType::FullScope), vec![
      0, 1, 1, 1, 2, 2, 0, 0
    ]);
  }

  #[test]
  fn code_only_ends_at_last_code_line() {
    assert_eq!(levels(PY, 2, MarkerType::CodeOnly), vec![
      0, 1, 1, 1, 2, 0, 0, 0
    ]);
  }

  #[test]
  fn blank_before_a_deeper_line_steps_one_level() {
    let text = "a\n\n      b\nc";
    assert_eq!(levels(text, 2, MarkerType::CodeOnly), vec![0, 1, 3, 0]);

    // Nothing but blank lines above: no guide may start on a blank line.
    let text = "\n\n    b\nc";
    assert_eq!(levels(text, 2, MarkerType::CodeOnly), vec![0, 0, 2, 0]);

    let text = "a\n  b\n\n      c\nd";
    assert_eq!(levels(text, 2, MarkerType::FullScope), vec![0, 1, 2, 3, 0]);
  }

  #[test]
  fn last_line_levels() {
    // Empty after a final line break: the block is closed.
    assert_eq!(levels("if x:\n  y()\n", 2, MarkerType::FullScope), vec![
      0, 1, 0
    ]);
    // Whitespace left behind by auto-indent stays inside the block.
    assert_eq!(levels("if x:\n  y()\n  ", 2, MarkerType::FullScope), vec![
      0, 1, 1
    ]);
    assert_eq!(levels("if x:\n  y()\n  ", 2, MarkerType::CodeOnly), vec![
      0, 1, 1
    ]);
    assert_eq!(levels("if x:\n  y()\n\n  ", 2, MarkerType::FullScope), vec![
      0, 1, 1, 1
    ]);
  }

  #[test]
  fn unit_width_scales_levels() {
    assert_eq!(levels("a\n    b\n        c\n", 4, MarkerType::FullScope), vec![
      0, 1, 2, 0
    ]);
    assert_eq!(levels("a\n    b\n        c\n", 2, MarkerType::FullScope), vec![
      0, 2, 4, 0
    ]);
    assert_eq!(levels("a\n\tb\n\t\tc\n", 4, MarkerType::FullScope), vec![
      0, 1, 2, 0
    ]);
  }

  #[test]
  fn neighbours_outside_the_set_are_read_from_the_host() {
    let doc = GuideDocument::new(PY, 2);
    let blank = doc.line(6).unwrap();
    let map = IndentationMap::new(&[blank], &doc, 2, MarkerType::FullScope);
    assert_eq!(map.level(6), 2);
    assert!(map.contains(5));
    assert_eq!(map.get(5).unwrap().col, 4);
  }

  #[test]
  fn active_lines_of_a_nested_block() {
    let doc = GuideDocument::new(PY, 2);
    let lines = all_lines(&doc);
    let map = IndentationMap::new(&lines, &doc, 2, MarkerType::FullScope);

    let active = map.active_lines(5).unwrap();
    assert_eq!(active, vec![
      ActiveLine {
        number: 5,
        active: 2,
      },
      ActiveLine {
        number: 6,
        active: 2,
      },
    ]);

    let numbers: Vec<_> = map
      .active_lines(2)
      .unwrap()
      .iter()
      .map(|line| line.number)
      .collect();
    assert_eq!(numbers, vec![2, 3, 4, 5, 6]);
    assert!(map.active_lines(2).unwrap().iter().all(|line| line.active == 1));
  }

  #[test]
  fn block_openers_and_closers_join_the_deeper_block() {
    let doc = GuideDocument::new(PY, 2);
    let lines = all_lines(&doc);
    let map = IndentationMap::new(&lines, &doc, 2, MarkerType::FullScope);

    // `def f():` opens the level 1 block.
    let opener = map.active_lines(1).unwrap();
    assert_eq!(opener.first().unwrap().number, 2);
    assert_eq!(opener.last().unwrap().number, 6);
    // `if a:` opens the level 2 block.
    assert_eq!(map.active_lines(4).unwrap()[0].active, 2);
    // `c()` closes the blocks above it and joins the innermost one.
    assert_eq!(map.active_lines(7).unwrap()[0].active, 2);
    assert_eq!(map.active_lines(8), None);
    assert_eq!(map.active_lines(42), None);
  }
}
