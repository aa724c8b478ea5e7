use crate::Tendril;

/// A logical document line at a point in time.
///
/// Offsets are char indices into the document. `to` points at the end of the
/// line content and never includes the line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
  /// 1-based line number.
  pub number: usize,
  pub from:   usize,
  pub to:     usize,
  pub text:   Tendril,
}

impl Line {
  pub fn new(number: usize, from: usize, text: impl Into<Tendril>) -> Self {
    let text = text.into();
    let to = from + text.chars().count();
    Self {
      number,
      from,
      to,
      text,
    }
  }

  pub fn len(&self) -> usize {
    self.to - self.from
  }

  pub fn is_empty(&self) -> bool {
    self.from == self.to
  }

  /// Empty or whitespace only.
  pub fn is_blank(&self) -> bool {
    self.text.chars().all(char::is_whitespace)
  }
}
