//! Foldable, interactive indentation guides.
//!
//! The crate computes per-line indentation levels for the visible part of a
//! document, turns them into backend-agnostic marker groups, and drives an
//! overlay state machine (active block, hovered block, click-to-fold) on top
//! of a host editor reached through [`host::GuideHost`].
//!
//! Drawing is left to the client: it reads the [`decoration::DecorationSet`]
//! and the [`highlight::HighlightLayer`] owned by the
//! [`controller::OverlayController`] and renders them however it likes.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod block;
pub mod config;
pub mod controller;
pub mod decoration;
pub mod document;
pub mod fold;
pub mod highlight;
pub mod host;
pub mod line;
pub mod map;
pub mod theme;
pub mod visible;

pub use block::{
  BlockRange,
  LineLevels,
};
pub use config::{
  ConfigError,
  GuideColors,
  GuidesConfig,
};
pub use controller::{
  ActiveBlock,
  EventDisposition,
  HoveredBlock,
  OverlayController,
  OverlayPhase,
  PointerTarget,
};
pub use decoration::{
  DecorationSet,
  Marker,
  MarkerGroup,
  MarkerId,
  MarkerStyle,
};
pub use document::GuideDocument;
pub use host::{
  FoldRange,
  GuideHost,
  ScrollAlign,
  ViewUpdate,
};
pub use line::Line;
pub use map::{
  IndentationMap,
  MarkerType,
};

pub type Tendril = SmartString<LazyCompact>;
