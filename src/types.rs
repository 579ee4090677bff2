use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What the runner does with the remaining steps once a step fails
/// (non-zero exit, signal, or timeout).
///
/// - `Stop`: skip the rest of the plan (default). A failed compile never
///   leads to running a stale binary.
/// - `Continue`: run every step regardless, like the original tool did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    Stop,
    Continue,
}

impl Default for StepPolicy {
    fn default() -> Self {
        StepPolicy::Stop
    }
}

impl FromStr for StepPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(StepPolicy::Stop),
            "continue" => Ok(StepPolicy::Continue),
            other => Err(format!(
                "invalid on_step_failure: {other} (expected \"stop\" or \"continue\")"
            )),
        }
    }
}

/// Parse a duration string such as `"250ms"`, `"10s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration too large".to_string())
}
