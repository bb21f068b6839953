//! Unit tests for scheduler cron expressions

use cron::Schedule;
use std::str::FromStr;

use perpsentry::core::scheduler::{cron_expression, SchedulerError};

#[test]
fn test_cron_expression_seconds() {
    assert_eq!(cron_expression(30).unwrap(), "*/30 * * * * *");
}

#[test]
fn test_cron_expression_minutes() {
    assert_eq!(cron_expression(60).unwrap(), "0 */1 * * * *");
    assert_eq!(cron_expression(300).unwrap(), "0 */5 * * * *");
}

#[test]
fn test_cron_expression_hours() {
    assert_eq!(cron_expression(3600).unwrap(), "0 0 */1 * * *");
    assert_eq!(cron_expression(14400).unwrap(), "0 0 */4 * * *");
    // not a whole number of hours
    assert_eq!(cron_expression(5400).unwrap(), "0 */90 * * * *");
}

#[test]
fn test_cron_expression_disabled() {
    assert!(matches!(cron_expression(0), Err(SchedulerError::Disabled)));
}

#[test]
fn test_cron_expressions_parse() {
    for interval in [15, 60, 300, 900, 3600, 7200] {
        let expr = cron_expression(interval).unwrap();
        assert!(Schedule::from_str(&expr).is_ok(), "{} did not parse", expr);
    }
}
