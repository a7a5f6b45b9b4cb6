//! Settings from `booking.toml` and the environment

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use eyre::{eyre, Result};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "booking.toml";

#[derive(Clone, Deserialize, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    #[serde(skip)]
    pub settings_file: Option<PathBuf>,

    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<u32>,

    /// Directory holding `booking.redb`; in-memory storage when absent
    pub data_dir: Option<PathBuf>,
}

impl Settings {
    /// Load `booking.toml` from the current directory or one of its ancestors
    ///
    /// Missing settings are not an error. `BOOKING_DATA_DIR` and
    /// `BOOKING_PORT` override the file.
    pub fn load() -> Result<Self> {
        let mut settings = match find(&std::env::current_dir()?)? {
            Some(path) => Self::from_file(&path)?,
            None => Settings::default(),
        };

        if let Some(dir) = std::env::var_os("BOOKING_DATA_DIR") {
            if !dir.is_empty() {
                settings.data_dir = Some(dir.into());
            }
        }
        if let Ok(port) = std::env::var("BOOKING_PORT") {
            settings.port = Some(
                port.parse()
                    .map_err(|_| eyre!("BOOKING_PORT takes a decimal u16, got {port:?}"))?,
            );
        }

        Ok(settings)
    }

    /// Parse a settings file, resolving a relative `data-dir` against it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&contents)?;

        if let (Some(data_dir), Some(base)) = (&settings.data_dir, path.parent()) {
            if data_dir.is_relative() {
                settings.data_dir = Some(Path::join(base, data_dir));
            }
        }
        settings.settings_file = Some(path.to_path_buf());
        Ok(settings)
    }
}

/// Walk up from `start` looking for [`SETTINGS_FILE`]
fn find(start: &Path) -> Result<Option<PathBuf>> {
    let mut path = start.to_path_buf();
    loop {
        path.push(SETTINGS_FILE);

        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => return Ok(Some(path)),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        path.pop();
        if !path.pop() {
            return Ok(None);
        }
    }
}
