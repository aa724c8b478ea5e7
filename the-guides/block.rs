//! Flattened level cache and the block scan over it.

use std::collections::HashMap;

/// Inclusive range of line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
  pub start: usize,
  pub end:   usize,
}

impl BlockRange {
  pub const fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  pub fn contains(&self, line: usize) -> bool {
    self.start <= line && line <= self.end
  }

  pub fn len(&self) -> usize {
    self.end + 1 - self.start
  }

  pub fn lines(&self) -> impl Iterator<Item = usize> {
    self.start..=self.end
  }
}

/// `line number -> level` snapshot of an indentation map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineLevels {
  levels: HashMap<usize, usize>,
}

impl LineLevels {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, line: usize, level: usize) {
    self.levels.insert(line, level);
  }

  /// Level of `line`, 0 when the line is not cached.
  pub fn get(&self, line: usize) -> usize {
    self.levels.get(&line).copied().unwrap_or(0)
  }

  pub fn contains(&self, line: usize) -> bool {
    self.levels.contains_key(&line)
  }

  pub fn len(&self) -> usize {
    self.levels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.levels.is_empty()
  }

  /// Maximal run of cached lines around `line` whose level is at least `col`.
  ///
  /// `line` itself is not checked. A line missing from the cache ends the
  /// scan in either direction.
  pub fn block_range(&self, line: usize, col: usize) -> BlockRange {
    let reaches = |line: usize| self.levels.get(&line).is_some_and(|&level| level >= col);

    let mut start = line;
    while start > 1 && reaches(start - 1) {
      start -= 1;
    }

    let mut end = line;
    while reaches(end + 1) {
      end += 1;
    }

    BlockRange { start, end }
  }
}

impl FromIterator<(usize, usize)> for LineLevels {
  fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
    Self {
      levels: iter.into_iter().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use quickcheck::{
    TestResult,
    quickcheck,
  };

  use super::*;

  fn cache(levels: &[usize]) -> LineLevels {
    levels
      .iter()
      .enumerate()
      .map(|(index, &level)| (index + 1, level))
      .collect()
  }

  #[test]
  fn scans_both_ways_while_deep_enough() {
    let levels = cache(&[0, 1, 1, 0]);
    assert_eq!(levels.block_range(2, 1), BlockRange::new(2, 3));
    assert_eq!(levels.block_range(3, 1), BlockRange::new(2, 3));

    let levels = cache(&[0, 1, 2, 2, 1, 3, 0]);
    assert_eq!(levels.block_range(4, 2), BlockRange::new(3, 4));
    assert_eq!(levels.block_range(4, 1), BlockRange::new(2, 6));
    assert_eq!(levels.block_range(6, 3), BlockRange::new(6, 6));
  }

  #[test]
  fn missing_lines_end_the_scan() {
    let levels: LineLevels = [(3, 1), (4, 1), (6, 1)].into_iter().collect();
    assert_eq!(levels.block_range(4, 1), BlockRange::new(3, 4));
    assert_eq!(levels.block_range(6, 1), BlockRange::new(6, 6));
    assert_eq!(levels.get(5), 0);
    assert!(!levels.contains(5));
  }

  #[test]
  fn range_helpers() {
    let range = BlockRange::new(3, 5);
    assert!(range.contains(3) && range.contains(5));
    assert!(!range.contains(6));
    assert_eq!(range.len(), 3);
    assert_eq!(range.lines().collect::<Vec<_>>(), vec![3, 4, 5]);
  }

  quickcheck! {
    fn block_range_is_symmetric(raw: Vec<u8>, pick: usize, col: u8) -> TestResult {
      if raw.is_empty() {
        return TestResult::discard();
      }
      let levels: Vec<usize> = raw.iter().map(|level| usize::from(level % 5)).collect();
      let col = usize::from(col % 4) + 1;
      let line = pick % levels.len() + 1;
      if levels[line - 1] < col {
        return TestResult::discard();
      }

      let cache = cache(&levels);
      let range = cache.block_range(line, col);
      let symmetric = range.lines().all(|member| cache.block_range(member, col) == range);
      let maximal = range.lines().all(|member| cache.get(member) >= col)
        && cache.get(range.start - 1) < col
        && cache.get(range.end + 1) < col;
      TestResult::from_bool(symmetric && maximal)
    }
  }
}
