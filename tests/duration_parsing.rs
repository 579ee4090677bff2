use std::time::Duration;

use clap::Parser;

use coderun::cli::CliArgs;
use coderun::types::parse_duration;

#[test]
fn units_are_scaled() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration(" 1H "), Ok(Duration::from_secs(3600)));
}

#[test]
fn malformed_durations_are_rejected() {
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("s").is_err());
    assert!(parse_duration("5d").is_err());
}

#[test]
fn overflowing_durations_are_rejected() {
    assert_eq!(
        parse_duration("5124095576030432h"),
        Err("duration too large".to_string())
    );
    assert_eq!(
        parse_duration(&format!("{}m", u64::MAX)),
        Err("duration too large".to_string())
    );
    assert_eq!(
        parse_duration(&format!("{}s", u64::MAX)),
        Ok(Duration::from_secs(u64::MAX))
    );
}

#[test]
fn overflowing_timeout_flag_is_a_usage_error() {
    let parsed = CliArgs::try_parse_from(["coderun", "--timeout", "5124095576030432h", "a.py"]);
    let err = parsed.unwrap_err();
    assert!(err.to_string().contains("duration too large"));
}
