//! Locating and toggling the fold behind a guide.

use tracing::debug;

use crate::host::{
  FoldRange,
  GuideHost,
  ScrollAlign,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldToggle {
  Folded,
  Unfolded,
}

/// The foldable range for line `number`, or failing that the closest one
/// above it that spans the whole line.
pub fn nearest_fold_range<H: GuideHost + ?Sized>(host: &H, number: usize) -> Option<FoldRange> {
  let line = host.line(number)?;
  if let Some(range) = host.foldable(line.from, line.to) {
    return Some(range);
  }

  (1..number).rev().find_map(|above| {
    let up = host.line(above)?;
    host
      .foldable(up.from, up.to)
      .filter(|range| range.from <= line.from && range.to >= line.to)
  })
}

/// Fold `range`, or unfold it when an existing fold already covers it, then
/// bring its start into view.
pub fn toggle_fold_range<H: GuideHost + ?Sized>(host: &mut H, range: FoldRange) -> FoldToggle {
  let covered = host
    .folded_ranges(range.from, range.to)
    .iter()
    .any(|fold| fold.covers(range));

  let toggle = if covered {
    host.unfold(range);
    FoldToggle::Unfolded
  } else {
    host.fold(range);
    FoldToggle::Folded
  };
  host.scroll_into_view(range.from, ScrollAlign::Nearest);

  debug!(from = range.from, to = range.to, ?toggle, "toggled fold");
  toggle
}

/// Inclusive line spans of every fold in the document.
pub fn folded_line_spans<H: GuideHost + ?Sized>(host: &H) -> Vec<(usize, usize)> {
  host
    .folded_ranges(0, host.doc_end())
    .into_iter()
    .map(|fold| (host.line_at(fold.from).number, host.line_at(fold.to).number))
    .collect()
}

/// Whether line `number` lies within one of `spans`, as returned by
/// [`folded_line_spans`].
pub fn spans_contain(spans: &[(usize, usize)], number: usize) -> bool {
  spans
    .iter()
    .any(|&(first, last)| first <= number && number <= last)
}

/// Whether line `number` lies within the line span of any fold, header
/// included.
pub fn is_line_folded<H: GuideHost + ?Sized>(host: &H, number: usize) -> bool {
  spans_contain(&folded_line_spans(host), number)
}

pub fn is_line_blank<H: GuideHost + ?Sized>(host: &H, number: usize) -> bool {
  host.line(number).is_some_and(|line| line.is_blank())
}

#[cfg(test)]
mod tests {
  use quickcheck::quickcheck;

  use super::*;
  use crate::document::GuideDocument;

  const PY: &str = "def f():\n  a = 1\n\n  if a:\n    b()\nc()\n";

  #[test]
  fn nearest_range_walks_up_to_the_parent() {
    let doc = GuideDocument::new(PY, 2);
    let header = doc.line(1).unwrap();
    let outer = FoldRange::new(header.to, doc.line(5).unwrap().to);

    assert_eq!(nearest_fold_range(&doc, 1), Some(outer));
    // `a = 1` opens nothing, its parent is the function.
    assert_eq!(nearest_fold_range(&doc, 2), Some(outer));
    let inner = doc.line(4).unwrap();
    assert_eq!(
      nearest_fold_range(&doc, 4),
      Some(FoldRange::new(inner.to, doc.line(5).unwrap().to))
    );
    // Top level code has no enclosing fold.
    assert_eq!(nearest_fold_range(&doc, 6), None);
    assert_eq!(nearest_fold_range(&doc, 0), None);
  }

  #[test]
  fn toggle_folds_then_unfolds() {
    let mut doc = GuideDocument::new(PY, 2).with_viewport(1, 3);
    let range = nearest_fold_range(&doc, 4).unwrap();

    assert_eq!(toggle_fold_range(&mut doc, range), FoldToggle::Folded);
    assert_eq!(doc.folds(), &[range]);
    assert_eq!(doc.last_scroll(), Some((range.from, ScrollAlign::Nearest)));
    assert!(is_line_folded(&doc, 4));
    assert!(is_line_folded(&doc, 5));
    assert!(!is_line_folded(&doc, 3));

    assert_eq!(toggle_fold_range(&mut doc, range), FoldToggle::Unfolded);
    assert!(doc.folds().is_empty());
    assert!(!is_line_folded(&doc, 5));
  }

  #[test]
  fn covered_range_unfolds_the_cover() {
    let mut doc = GuideDocument::new(PY, 2);
    let outer = nearest_fold_range(&doc, 1).unwrap();
    let inner = nearest_fold_range(&doc, 4).unwrap();
    doc.fold(outer);

    assert_eq!(toggle_fold_range(&mut doc, inner), FoldToggle::Unfolded);
    assert!(doc.folds().is_empty());
    // The next toggle folds only the inner block.
    assert_eq!(toggle_fold_range(&mut doc, inner), FoldToggle::Folded);
    assert_eq!(doc.folds(), &[inner]);
    assert!(!is_line_folded(&doc, 2));
  }

  #[test]
  fn spans_include_both_ends() {
    let spans = [(2, 4), (7, 7)];
    assert!(!spans_contain(&spans, 1));
    assert!(spans_contain(&spans, 2));
    assert!(spans_contain(&spans, 4));
    assert!(!spans_contain(&spans, 5));
    assert!(spans_contain(&spans, 7));
    assert!(!spans_contain(&[], 1));
  }

  #[test]
  fn blank_lines() {
    let doc = GuideDocument::new(PY, 2);
    assert!(is_line_blank(&doc, 3));
    assert!(is_line_blank(&doc, 7));
    assert!(!is_line_blank(&doc, 2));
    assert!(!is_line_blank(&doc, 99));
  }

  quickcheck! {
    fn toggling_twice_restores_membership(line: u8, prefold: bool) -> bool {
      let mut doc = GuideDocument::new(PY, 2);
      let Some(range) = nearest_fold_range(&doc, usize::from(line % 7) + 1) else {
        return true;
      };
      if prefold {
        doc.fold(range);
      }
      let covered = |doc: &GuideDocument| doc.folds().iter().any(|fold| fold.covers(range));
      let before = covered(&doc);
      toggle_fold_range(&mut doc, range);
      let flipped = covered(&doc) != before;
      toggle_fold_range(&mut doc, range);
      flipped && covered(&doc) == before
    }
  }
}
