use failure::Error;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

/// How the editor spaces rows on screen, which decides the axis position
/// queries snap on: constant-time displays place events by seconds, the
/// other modes by row.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingMode {
  #[serde(rename = "constant_time")]
  ConstantTime,
  #[serde(rename = "constant_row")]
  ConstantRow,
  #[serde(rename = "variable")]
  Variable,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Editor {
  pub spacing_mode: SpacingMode,
  pub default_scroll_rate: f64,
}

impl Default for Editor {
  fn default() -> Editor {
    Editor {
      spacing_mode: SpacingMode::Variable,
      default_scroll_rate: 1.0,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
  pub editor: Editor,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      editor: Editor::default(),
    }
  }
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}
