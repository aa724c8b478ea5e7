use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  map::MarkerType,
  theme::{
    Mode,
    Rgba,
  },
};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error(transparent)]
  Parse(#[from] toml::de::Error),
  #[error("invalid color for '{key}': {value:?}")]
  InvalidColor { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GuidesConfig {
  pub highlight_active_marker:            bool,
  pub highlight_hovered_marker:           bool,
  pub highlight_active_block_background:  bool,
  pub highlight_hovered_block_background: bool,
  pub fold_block_on_click:                bool,
  pub hide_first_indent:                  bool,
  pub marker_type:                        MarkerType,
  pub thickness:                          u16,
  pub active_thickness:                   Option<u16>,
  pub hover_thickness:                    Option<u16>,
  pub additional_padding:                 u16,
  pub colors:                             GuideColors,
}

impl Default for GuidesConfig {
  fn default() -> Self {
    Self {
      highlight_active_marker:            true,
      highlight_hovered_marker:           true,
      highlight_active_block_background:  true,
      highlight_hovered_block_background: true,
      fold_block_on_click:                true,
      hide_first_indent:                  false,
      marker_type:                        MarkerType::FullScope,
      thickness:                          1,
      active_thickness:                   None,
      hover_thickness:                    None,
      additional_padding:                 0,
      colors:                             GuideColors::default(),
    }
  }
}

impl GuidesConfig {
  pub fn from_toml(source: &str) -> Result<Self> {
    let config: Self = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;
    Self::from_toml(&source)
  }

  /// Reject colors that do not parse in either mode.
  pub fn validate(&self) -> Result<()> {
    self.colors.palette(Mode::Light)?;
    self.colors.palette(Mode::Dark)?;
    Ok(())
  }

  pub fn active_thickness(&self) -> u16 {
    self.active_thickness.unwrap_or(self.thickness)
  }

  pub fn hover_thickness(&self) -> u16 {
    self.hover_thickness.unwrap_or(self.thickness)
  }

  /// Whether anything reacts to the cursor moving.
  pub fn tracks_active(&self) -> bool {
    self.highlight_active_marker || self.highlight_active_block_background
  }

  /// Whether anything reacts to pointer motion.
  pub fn tracks_hover(&self) -> bool {
    self.highlight_hovered_marker || self.highlight_hovered_block_background
  }
}

/// Hex colors per mode. Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct GuideColors {
  pub light:                  String,
  pub dark:                   String,
  pub active_light:           String,
  pub active_dark:            String,
  pub hover_light:            String,
  pub hover_dark:             String,
  pub background_light:       String,
  pub background_dark:        String,
  pub background_hover_light: String,
  pub background_hover_dark:  String,
}

impl Default for GuideColors {
  fn default() -> Self {
    Self {
      light:                  "#F0F1F2".into(),
      dark:                   "#2B3245".into(),
      active_light:           "#E4E5E6".into(),
      active_dark:            "#3C445C".into(),
      hover_light:            "#E4E5E6".into(),
      hover_dark:             "#3C445C".into(),
      background_light:       "#e4e5e630".into(),
      background_dark:        "#3c445c30".into(),
      background_hover_light: "#e4e5e630".into(),
      background_hover_dark:  "#3c445c30".into(),
    }
  }
}

impl GuideColors {
  /// Base marker color for `mode`, if it parses.
  pub fn base(&self, mode: Mode) -> Option<Rgba> {
    match mode {
      Mode::Light => Rgba::from_hex(&self.light),
      Mode::Dark => Rgba::from_hex(&self.dark),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn defaults() {
    let config = GuidesConfig::default();
    assert!(config.highlight_active_marker);
    assert!(config.highlight_hovered_block_background);
    assert!(config.fold_block_on_click);
    assert!(!config.hide_first_indent);
    assert_eq!(config.marker_type, MarkerType::FullScope);
    assert_eq!(config.thickness, 1);
    assert_eq!(config.active_thickness(), 1);
    assert_eq!(config.hover_thickness(), 1);
    assert!(config.tracks_active() && config.tracks_hover());
    assert_eq!(config.colors.base(Mode::Dark), Rgba::from_hex("#2B3245"));
  }

  #[test]
  fn empty_source_is_the_default() {
    assert_eq!(GuidesConfig::from_toml("").unwrap(), GuidesConfig::default());
  }

  #[test]
  fn kebab_case_keys() {
    let config = GuidesConfig::from_toml(
      r##"
        hide-first-indent = true
        marker-type = "code-only"
        thickness = 2
        hover-thickness = 3
        highlight-hovered-marker = false

        [colors]
        dark = "#101010"
      "##,
    )
    .unwrap();

    assert!(config.hide_first_indent);
    assert_eq!(config.marker_type, MarkerType::CodeOnly);
    assert_eq!(config.active_thickness(), 2);
    assert_eq!(config.hover_thickness(), 3);
    assert!(config.tracks_hover());
    assert_eq!(config.colors.dark, "#101010");
    assert_eq!(config.colors.light, GuideColors::default().light);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(matches!(
      GuidesConfig::from_toml("marker-kind = \"code-only\""),
      Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
      GuidesConfig::from_toml("[colors]\nshade = \"#fff\""),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn malformed_colors_fail_validation() {
    let err = GuidesConfig::from_toml("[colors]\nactive-light = \"#12345\"").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidColor {
      key: "active-light",
      ..
    }));
  }

  #[test]
  fn load_reads_from_disk() {
    let path = std::env::temp_dir().join(format!("the-guides-config-{}.toml", std::process::id()));
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "additional-padding = 4").unwrap();
    drop(file);

    let config = GuidesConfig::load(&path).unwrap();
    assert_eq!(config.additional_padding, 4);
    fs::remove_file(&path).unwrap();

    assert!(matches!(
      GuidesConfig::load(&path),
      Err(ConfigError::Io { .. })
    ));
  }
}
