//! JSON file persistence for the task tree, the assignment index and the config.
//!
//! All three files share the same policy: a missing file is created from a
//! default value, a malformed file is an error (never silently replaced), and
//! writes go through a temp file that is renamed over the target.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Load `path`, or write `init()` to it and return that when the file is absent.
pub fn load_or_init<T, F>(path: &Path, init: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if !path.exists() {
        let value = init();
        save_json(path, &value)?;
        info!(path = %path.display(), "initialised data file");
        return Ok(value);
    }
    load_json(path)
}

/// Read and parse `path`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let buf = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let value = serde_json::from_str(&buf).map_err(|source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = buf.len(), "loaded data file");
    Ok(value)
}

/// Save `value` as pretty JSON using an atomic-ish write (temp + rename).
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let data = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
    f.write_all(data.as_bytes()).map_err(|e| Error::io(&tmp, e))?;
    f.flush().map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), bytes = data.len(), "saved data file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_initialised() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.json");
        let value: BTreeMap<String, u32> = load_or_init(&path, BTreeMap::new).unwrap();
        assert!(value.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn malformed_file_fails_loudly_and_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_or_init::<BTreeMap<String, u32>, _>(&path, BTreeMap::new).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let mut value = BTreeMap::new();
        value.insert("ß".to_string(), 3u32);
        save_json(&path, &value).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert!(fs::read_to_string(&path).unwrap().contains("ß"));
        let back: BTreeMap<String, u32> = load_json(&path).unwrap();
        assert_eq!(back, value);
    }
}
