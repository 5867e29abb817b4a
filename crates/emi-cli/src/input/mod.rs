pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Structured input from `--input`, else from piped stdin, else `None`.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(
            serde_json::from_value(value).map_err(|e| format!("Invalid JSON on stdin: {e}"))?,
        )),
        None => Ok(None),
    }
}
