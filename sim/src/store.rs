//! Record persistence.
//!
//! The record lives in a JSON object under [`RECORD_KEY`], so the file can be
//! shared with other keys a host stores next to it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use emoji_battler_core::{Record, RECORD_KEY};
use serde_json::{Map, Value};

fn read_object(path: &Path) -> anyhow::Result<Map<String, Value>> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(Map::new()),
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(e.into()),
    }
}

/// Load the stored record; a missing file or key is an empty record
pub fn load(path: &Path) -> anyhow::Result<Record> {
    let object = read_object(path)?;
    match object.get(RECORD_KEY) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(Record::default()),
    }
}

/// Store `record`, keeping any other keys in the file
pub fn save(path: &Path, record: &Record) -> anyhow::Result<()> {
    let mut object = read_object(path)?;
    object.insert(RECORD_KEY.to_string(), serde_json::to_value(record)?);
    fs::write(path, serde_json::to_string_pretty(&Value::Object(object))?)?;
    Ok(())
}

pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("emoji-battler-record-{}.json", clock_seed()));
        fs::write(&path, r#"{"other": 1}"#).unwrap();

        assert_eq!(load(&path).unwrap(), Record::default());

        let record = Record {
            wins: 3,
            losses: 1,
            draws: 0,
            points: 2,
        };
        save(&path, &record).unwrap();
        assert_eq!(load(&path).unwrap(), record);

        let stored: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["other"], 1);
        assert_eq!(stored["emojiBattlerRecord"]["wins"], 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_empty_record() {
        let path = std::env::temp_dir().join("emoji-battler-record-does-not-exist.json");
        assert_eq!(load(&path).unwrap(), Record::default());
    }
}
