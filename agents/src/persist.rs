//! MessagePack files for learned state (utility tables, network weights).

use crate::error::PersistenceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Writes `value` to `path`, creating parent directories as needed.
pub fn write_msgpack<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
            operation: "create directory for",
            path: path.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| PersistenceError::Io {
        operation: "create",
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    rmp_serde::encode::write(&mut writer, value).map_err(|source| PersistenceError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| PersistenceError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_msgpack<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| PersistenceError::Io {
        operation: "open",
        path: path.to_path_buf(),
        source,
    })?;
    rmp_serde::decode::from_read(BufReader::new(file)).map_err(|source| PersistenceError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
