pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read a typed JSON document from `--input`, falling back to piped stdin.
///
/// Returns `None` when neither source is available.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    stdin::read_stdin()
}
