//! Logging to stderr so it never mixes with the rendered document.
//!
//! Filter priority: `THE_GUIDES_LOG`, then `RUST_LOG`, then the `-v` count
//! (`warn`, `info`, `debug`, `trace`).

use std::{
  env,
  io,
};

use eyre::{
  Result,
  eyre,
};
use tracing_subscriber::EnvFilter;

const CRATES: [&str; 2] = ["the_guides", "the_guides_term"];

pub fn init(verbose: u8) -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(filter(verbose))
    .with_writer(io::stderr)
    .with_target(false)
    .try_init()
    .map_err(|err| eyre!("failed to install logger: {err}"))
}

fn filter(verbose: u8) -> EnvFilter {
  if let Ok(level) = env::var("THE_GUIDES_LOG") {
    return EnvFilter::new(expand(&level));
  }
  if let Ok(rust_log) = env::var("RUST_LOG") {
    return EnvFilter::new(rust_log);
  }

  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  EnvFilter::new(expand(level))
}

/// A bare level applies to our crates only; directives pass through.
fn expand(level: &str) -> String {
  if level.contains(['=', ',', ':']) {
    return level.to_string();
  }
  let crates: Vec<_> = CRATES
    .iter()
    .map(|name| format!("{name}={level}"))
    .collect();
  format!("warn,{}", crates.join(","))
}

#[cfg(test)]
mod tests {
  use super::expand;

  #[test]
  fn bare_levels_target_our_crates() {
    assert_eq!(
      expand("debug"),
      "warn,the_guides=debug,the_guides_term=debug"
    );
    assert_eq!(expand("the_guides=trace"), "the_guides=trace");
  }
}
