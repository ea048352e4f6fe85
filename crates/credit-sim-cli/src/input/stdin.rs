use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Parse piped JSON from stdin. `None` on an interactive terminal or empty pipe.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    log::debug!("reading input from stdin ({} bytes)", trimmed.len());
    let parsed = serde_json::from_str(trimmed).map_err(|e| format!("Invalid input on stdin: {}", e))?;
    Ok(Some(parsed))
}
