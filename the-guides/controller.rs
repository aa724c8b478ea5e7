//! The overlay state machine.
//!
//! [`OverlayController`] owns the decorations, the level cache and the
//! highlight layer. Hosts feed it [`ViewUpdate`]s and pointer events and call
//! [`OverlayController::run_frame`] once per frame to flush the deferred
//! active block pass.
//!
//! ```
//! use the_guides::{
//!   GuideDocument,
//!   GuidesConfig,
//!   MarkerId,
//!   OverlayController,
//!   highlight::HighlightKind,
//! };
//!
//! let mut doc = GuideDocument::new("if x:\n  y()\n  z()\n", 2);
//! let mut overlay = OverlayController::new(&doc, GuidesConfig::default());
//!
//! doc.set_cursor_line(3);
//! let update = doc.take_update();
//! overlay.update(&doc, update);
//! overlay.run_frame();
//!
//! let active = overlay.highlights().marked(HighlightKind::Active);
//! assert_eq!(active, vec![MarkerId::new(2, 1), MarkerId::new(3, 1)]);
//! ```

use std::collections::BTreeSet;

use tracing::{
  debug,
  trace,
};

use crate::{
  block::{
    BlockRange,
    LineLevels,
  },
  config::GuidesConfig,
  decoration::{
    DecorationSet,
    MarkerId,
    build_decorations,
  },
  fold::{
    nearest_fold_range,
    toggle_fold_range,
  },
  highlight::{
    HighlightKind,
    HighlightLayer,
  },
  host::{
    GuideHost,
    ViewUpdate,
  },
  map::IndentationMap,
  visible::all_lines,
};

/// What the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
  /// Anywhere outside the guides.
  Outside,
  /// Inside a line's marker group but not on a marker.
  Group { line: usize },
  Marker(MarkerId),
}

impl PointerTarget {
  /// Whether the target lies inside a marker group.
  pub fn in_guides(&self) -> bool {
    !matches!(self, Self::Outside)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
  /// The host handles the event as usual.
  Ignored,
  /// The guides consumed the event; the host must not move the cursor.
  Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
  Idle,
  ActiveRecomputeScheduled,
  HoverTracking,
}

/// The block around the cursor. A `column` of 0 means there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveBlock {
  pub column: usize,
  pub start:  usize,
  pub end:    usize,
}

impl ActiveBlock {
  pub const NONE: Self = Self {
    column: 0,
    start:  0,
    end:    0,
  };

  pub fn is_none(&self) -> bool {
    self.column == 0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoveredBlock {
  pub col:   usize,
  pub start: usize,
  pub end:   usize,
}

impl HoveredBlock {
  pub fn contains(&self, id: MarkerId) -> bool {
    self.col == id.col && self.start <= id.line && id.line <= self.end
  }
}

/// Result of one active block recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePass {
  pub block: ActiveBlock,
  /// Markers to highlight, ascending.
  pub lines: Vec<MarkerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
  pub rebuilt:   bool,
  pub scheduled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingActive {
  generation: u64,
  line:       usize,
}

/// Compute the active block for the cursor on `line`.
///
/// When `line` is not in `map` the block is recovered from `previous`: the
/// level cache is scanned around both of its edges at its column.
pub fn recompute_active(
  map: &IndentationMap,
  levels: &LineLevels,
  line: usize,
  previous: ActiveBlock,
) -> ActivePass {
  if map.contains(line) {
    let Some(lines) = map.active_lines(line) else {
      return ActivePass {
        block: ActiveBlock::NONE,
        lines: Vec::new(),
      };
    };
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
      return ActivePass {
        block: ActiveBlock::NONE,
        lines: Vec::new(),
      };
    };

    return ActivePass {
      block: ActiveBlock {
        column: first.active,
        start:  first.number,
        end:    last.number,
      },
      lines: lines
        .iter()
        .map(|line| MarkerId::new(line.number, line.active))
        .collect(),
    };
  }

  if previous.is_none() {
    return ActivePass {
      block: previous,
      lines: Vec::new(),
    };
  }

  let column = previous.column;
  let ranges = [
    levels.block_range(previous.start, column),
    levels.block_range(previous.end, column),
  ];
  let lines: BTreeSet<usize> = ranges.iter().flat_map(BlockRange::lines).collect();
  let start = ranges.iter().map(|range| range.start).min().unwrap_or(previous.start);
  let end = ranges.iter().map(|range| range.end).max().unwrap_or(previous.end);

  ActivePass {
    block: ActiveBlock { column, start, end },
    lines: lines
      .into_iter()
      .map(|line| MarkerId::new(line, column))
      .collect(),
  }
}

#[derive(Debug)]
pub struct OverlayController {
  config:        GuidesConfig,
  decorations:   DecorationSet,
  map:           IndentationMap,
  levels:        LineLevels,
  highlights:    HighlightLayer,
  active:        ActiveBlock,
  hovered:       Option<HoveredBlock>,
  pending:       Option<PendingActive>,
  generation:    u64,
  indent_unit:   usize,
  cursor_line:   usize,
  content_width: usize,
}

impl OverlayController {
  pub fn new<H: GuideHost + ?Sized>(host: &H, config: GuidesConfig) -> Self {
    let mut controller = Self {
      config,
      decorations: DecorationSet::default(),
      map: IndentationMap::default(),
      levels: LineLevels::default(),
      highlights: HighlightLayer::default(),
      active: ActiveBlock::NONE,
      hovered: None,
      pending: None,
      generation: 0,
      indent_unit: host.indent_unit(),
      cursor_line: host.cursor_line().number,
      content_width: host.content_width(),
    };
    controller.rebuild(host);
    if controller.config.tracks_active() {
      controller.schedule_active();
    }
    controller
  }

  /// Swap the configuration and rebuild from scratch.
  pub fn reconfigure<H: GuideHost + ?Sized>(&mut self, host: &H, config: GuidesConfig) {
    self.config = config;
    self.rebuild(host);
    if self.config.tracks_active() {
      self.schedule_active();
    } else {
      self.pending = None;
      self.active = ActiveBlock::NONE;
    }
  }

  /// React to one host update tick.
  pub fn update<H: GuideHost + ?Sized>(&mut self, host: &H, update: ViewUpdate) -> UpdateOutcome {
    let unit_changed = host.indent_unit() != self.indent_unit;
    let rebuilt = update.doc_changed || update.viewport_changed || unit_changed;
    if rebuilt {
      self.rebuild(host);
    }

    let cursor_line = host.cursor_line().number;
    let content_width = host.content_width();
    let moved = cursor_line != self.cursor_line;
    let resized = content_width != self.content_width;
    self.cursor_line = cursor_line;
    self.content_width = content_width;

    let scheduled = self.config.tracks_active() && (rebuilt || moved || resized);
    if scheduled {
      self.schedule_active();
    }

    UpdateOutcome { rebuilt, scheduled }
  }

  /// Run the deferred active pass, if one is pending and still current.
  /// Returns whether a pass ran.
  pub fn run_frame(&mut self) -> bool {
    let Some(pending) = self.pending.take() else {
      return false;
    };
    if pending.generation != self.generation {
      trace!(
        scheduled = pending.generation,
        current = self.generation,
        "dropping superseded active pass"
      );
      return false;
    }

    self.highlights.clear(HighlightKind::Active);
    let pass = recompute_active(&self.map, &self.levels, pending.line, self.active);
    self.active = pass.block;
    for &id in &pass.lines {
      if self.config.highlight_active_marker {
        self
          .highlights
          .mark(&self.decorations, id, HighlightKind::Active);
      }
      if self.config.highlight_active_block_background {
        self.highlights.background(
          &self.decorations,
          id.line,
          id.col,
          HighlightKind::Active,
          self.content_width,
        );
      }
    }

    trace!(
      line = pending.line,
      column = pass.block.column,
      start = pass.block.start,
      end = pass.block.end,
      "active pass"
    );
    true
  }

  pub fn pointer_move(&mut self, target: PointerTarget) {
    if !self.config.tracks_hover() {
      return;
    }
    let PointerTarget::Marker(id) = target else {
      self.clear_hover();
      return;
    };
    if self.hovered.is_some_and(|hovered| hovered.contains(id)) {
      return;
    }
    if id.col == 0 || id.col > self.levels.get(id.line) {
      self.clear_hover();
      return;
    }

    let range = self.compute_block_range(id.line, id.col);
    self.apply_hover(HoveredBlock {
      col:   id.col,
      start: range.start,
      end:   range.end,
    });
  }

  /// The pointer left an element; `related` is where it went.
  pub fn pointer_out(&mut self, related: PointerTarget) {
    if !related.in_guides() {
      self.clear_hover();
    }
  }

  /// Fold or unfold the block of the pressed marker.
  pub fn pointer_down<H: GuideHost + ?Sized>(
    &mut self,
    host: &mut H,
    target: PointerTarget,
  ) -> EventDisposition {
    if !self.config.fold_block_on_click {
      return EventDisposition::Ignored;
    }
    let PointerTarget::Marker(id) = target else {
      return EventDisposition::Ignored;
    };
    if self.decorations.marker(id).is_none() {
      return EventDisposition::Ignored;
    }

    self.refresh_levels(&*host);
    let range = self.compute_block_range(id.line, id.col);
    let header = range.start.saturating_sub(1);
    if header == 0 {
      debug!(line = id.line, col = id.col, "block has no header line");
      return EventDisposition::Claimed;
    }
    if let Some(fold) = nearest_fold_range(&*host, header) {
      toggle_fold_range(host, fold);
    }
    EventDisposition::Claimed
  }

  /// Maximal run of lines around `line` whose cached level is at least `col`.
  pub fn compute_block_range(&self, line: usize, col: usize) -> BlockRange {
    self.levels.block_range(line, col)
  }

  pub fn config(&self) -> &GuidesConfig {
    &self.config
  }

  pub fn decorations(&self) -> &DecorationSet {
    &self.decorations
  }

  pub fn line_levels(&self) -> &LineLevels {
    &self.levels
  }

  pub fn indentation_map(&self) -> &IndentationMap {
    &self.map
  }

  pub fn highlights(&self) -> &HighlightLayer {
    &self.highlights
  }

  pub fn hovered(&self) -> Option<HoveredBlock> {
    self.hovered
  }

  pub fn active(&self) -> ActiveBlock {
    self.active
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn phase(&self) -> OverlayPhase {
    if self.pending.is_some() {
      OverlayPhase::ActiveRecomputeScheduled
    } else if self.hovered.is_some() {
      OverlayPhase::HoverTracking
    } else {
      OverlayPhase::Idle
    }
  }

  fn rebuild<H: GuideHost + ?Sized>(&mut self, host: &H) {
    let built = build_decorations(host, &self.config);
    self.decorations = built.decorations;
    self.map = built.map;
    self.levels = built.line_levels;
    self.indent_unit = host.indent_unit();
    self.generation = self.generation.wrapping_add(1);
    // The old marker ids may not exist anymore.
    self.highlights.clear_all();
    self.hovered = None;

    debug!(
      generation = self.generation,
      groups = self.decorations.len(),
      "rebuilt guides"
    );
  }

  fn refresh_levels<H: GuideHost + ?Sized>(&mut self, host: &H) {
    let lines = all_lines(host);
    let map = IndentationMap::new(
      &lines,
      host,
      host.indent_unit(),
      self.config.marker_type,
    );
    self.levels = lines
      .iter()
      .map(|line| (line.number, map.level(line.number)))
      .collect();
  }

  fn schedule_active(&mut self) {
    self.pending = Some(PendingActive {
      generation: self.generation,
      line:       self.cursor_line,
    });
  }

  fn apply_hover(&mut self, hovered: HoveredBlock) {
    self.highlights.clear(HighlightKind::Hover);
    for line in hovered.start..=hovered.end {
      let id = MarkerId::new(line, hovered.col);
      if self.config.highlight_hovered_marker {
        self
          .highlights
          .mark(&self.decorations, id, HighlightKind::Hover);
      }
      if self.config.highlight_hovered_block_background {
        self.highlights.background(
          &self.decorations,
          line,
          hovered.col,
          HighlightKind::Hover,
          self.content_width,
        );
      }
    }
    self.hovered = Some(hovered);
    trace!(
      col = hovered.col,
      start = hovered.start,
      end = hovered.end,
      "hovered block"
    );
  }

  fn clear_hover(&mut self) {
    if self.hovered.take().is_some() {
      trace!("cleared hover");
    }
    self.highlights.clear(HighlightKind::Hover);
  }
}
