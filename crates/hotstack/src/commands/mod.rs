pub mod cleanup;
pub mod wait_bmh;

use std::time::Duration;

/// Parse a `KEY=VALUE` template parameter
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid KEY=VALUE: no `=` found in `{}`", s)),
    }
}

/// Seconds from a flag, falling back to the settings file value
pub fn seconds(flag: Option<u64>, setting: u64) -> Duration {
    Duration::from_secs(flag.unwrap_or(setting))
}

/// Reject a zero polling interval before it turns into a busy loop
pub fn interval(name: &str, flag: Option<u64>, setting: u64) -> anyhow::Result<Duration> {
    let value = seconds(flag, setting);
    if value.is_zero() {
        anyhow::bail!("{} must be at least 1 second", name);
    }
    Ok(value)
}
