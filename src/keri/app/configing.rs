//! Configer manages the on-disk JSON configuration file for a Habitat.
//!
//! Mirrors the shape of `Baser`: a thin wrapper around `BaseFiler` that adds
//! JSON-specific get/put of a whole config document, keyed by top-level
//! field name (e.g. OOBIs, witness endpoints).

use crate::keri::core::errors::CoreError;
use crate::keri::core::filing::{BaseFiler, Filer, FilerDefaults};
use serde_json::{Map, Value};
use std::fs;

/// Configer holds a single JSON file of habitat configuration data such as
/// OOBIs and endpoint rows read at initialization time and consulted by
/// `Hab::reconfigure`.
pub struct Configer {
    filer: BaseFiler,
    pub opened: bool,
}

impl Filer for Configer {
    fn defaults() -> FilerDefaults {
        BaseFiler::defaults()
    }

    #[cfg(target_os = "windows")]
    const TAIL_DIR_PATH: &'static str = "keri\\cf";
    #[cfg(not(target_os = "windows"))]
    const TAIL_DIR_PATH: &'static str = "keri/cf";

    #[cfg(target_os = "windows")]
    const ALT_TAIL_DIR_PATH: &'static str = ".keri\\cf";
    #[cfg(not(target_os = "windows"))]
    const ALT_TAIL_DIR_PATH: &'static str = ".keri/cf";

    const TEMP_PREFIX: &'static str = "keri_cf_";
    const FEXT: &'static str = "json";
}

impl Configer {
    /// Open (creating if absent) the named config file under `base`.
    pub fn new(name: &str, base: &str, temp: bool, reopen: bool) -> Result<Self, CoreError> {
        let filer = BaseFiler::new(
            name.to_string(),
            base.to_string(),
            temp,
            None,
            None,
            reopen,
            false,
            true,
            false,
            true,
            true,
            None,
            Some(Configer::FEXT.to_string()),
            Some(Configer::defaults()),
        )?;
        let opened = filer.opened();
        Ok(Configer { filer, opened })
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    pub fn name(&self) -> String {
        self.filer.name()
    }

    /// Read the whole config document, or an empty object if the file is
    /// absent or empty (a brand new Habitat has no config yet).
    pub fn get(&self) -> Result<Map<String, Value>, CoreError> {
        let path = match self.filer.path() {
            Some(p) => p,
            None => return Ok(Map::new()),
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Ok(Map::new()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Ok(Map::new()),
        }
    }

    /// Overwrite the whole config document.
    pub fn put(&self, data: &Map<String, Value>) -> Result<(), CoreError> {
        let path = self
            .filer
            .path()
            .ok_or_else(|| CoreError::FilerError("Configer not opened".to_string()))?;

        let body = serde_json::to_string_pretty(data)
            .map_err(|e| CoreError::FilerError(format!("Bad config data: {}", e)))?;

        fs::write(&path, body).map_err(|e| CoreError::FilerError(format!("{}", e)))?;

        Ok(())
    }

    pub fn close(&mut self, clear: bool) -> Result<bool, CoreError> {
        let closed = self.filer.close(clear)?;
        self.opened = self.filer.opened();
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configer_round_trips_empty_and_populated_docs() {
        let cf = Configer::new("test_hab", "", true, true).expect("open configer");
        assert!(cf.opened());

        let empty = cf.get().expect("read empty config");
        assert!(empty.is_empty());

        let mut doc = Map::new();
        doc.insert("oobis".to_string(), Value::Array(vec![]));
        cf.put(&doc).expect("write config");

        let read_back = cf.get().expect("read back config");
        assert_eq!(read_back, doc);
    }
}
