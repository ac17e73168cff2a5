// SPDX-License-Identifier: MIT

//! Console logging setup and section helpers

use crate::chain::state::ChainState;
use chrono::{DateTime, Local, TimeZone};
use log::Level;
use std::fmt;
use std::io::Write;

const RULE_WIDTH: usize = 70;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Initialise `env_logger` with a `time | level | target | message` layout.
///
/// Defaults to `info`; HTTP client internals are capped at `warn`.
/// `RUST_LOG` overrides both.
pub fn init() {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper", log::LevelFilter::Warn)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(&Local::now(), record.level(), record.target(), record.args())
            )
        });

    // A second init (e.g. from tests) is harmless
    let _ = builder.try_init();
}

/// One log line, level padded to eight columns
pub fn format_line<Tz>(
    time: &DateTime<Tz>,
    level: Level,
    target: &str,
    args: impl fmt::Display,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "{} | {:<8} | {} | {}",
        time.format(TIME_FORMAT),
        level,
        target,
        args
    )
}

fn banner_text(text: &str) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    format!("\n{}\n▶ {}\n{}", rule, text, rule)
}

fn state_text(prefix: &str, state: &ChainState) -> String {
    format!("\n🔸 {} State:\n{}\n", prefix, state)
}

/// Log a section header
pub fn banner(text: &str) {
    log::info!("{}", banner_text(text));
}

/// Log the five state fields under a label
pub fn log_state(prefix: &str, state: &ChainState) {
    log::info!("{}", state_text(prefix, state));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
    }

    #[test]
    fn test_format_line_layout() {
        let line = format_line(
            &fixed_time(),
            Level::Info,
            "prompt_chain_rs::chain",
            "Letter generated",
        );
        assert_eq!(
            line,
            "2024-03-09 07:05:02 | INFO     | prompt_chain_rs::chain | Letter generated"
        );
    }

    #[test]
    fn test_format_line_level_column_is_padded() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            let line = format_line(&fixed_time(), level, "t", "m");
            let columns: Vec<&str> = line.split(" | ").collect();
            assert_eq!(columns.len(), 4, "{}", line);
            assert_eq!(columns[1].len(), 8);
            assert_eq!(columns[1].trim_end(), level.as_str());
        }
    }

    #[test]
    fn test_banner_text() {
        let text = banner_text("WORKFLOW START");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].chars().count(), RULE_WIDTH);
        assert_eq!(lines[2], "▶ WORKFLOW START");
        assert_eq!(lines[3], lines[1]);
    }

    #[test]
    fn test_state_text_has_every_field() {
        let state = ChainState {
            topic: Some("Chess".to_string()),
            letter: Some("K".to_string()),
            word: Some("King".to_string()),
            phrase: None,
            relevant: Some(false),
        };
        let text = state_text("Step 3", &state);

        assert!(text.contains("🔸 Step 3 State:"));
        for field in [
            "topic: \"Chess\"",
            "letter: \"K\"",
            "word: \"King\"",
            "phrase: None",
            "relevant: false",
        ] {
            assert!(text.contains(field), "missing {:?} in {}", field, text);
        }
    }
}
