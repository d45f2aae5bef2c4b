use std::{collections::HashSet, env, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, Result};

/// Forwarding policy. Loaded once at startup, read on every event, never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct ForwardingConfig {
    /// Master switch; when false no event is ever forwarded.
    pub enabled: bool,
    /// Severity labels admitted for forwarding, kept exactly as
    /// configured. Matching is a literal, case-sensitive string compare
    /// against the event's label, not a severity comparison: a label
    /// absent from this set is dropped even if it is more severe than a
    /// configured one.
    pub allowed_levels: HashSet<String>,
    /// Whether to append the error chain to forwarded messages.
    pub include_stack_trace: bool,
    /// Cap on forwarded stack frames (first N, original order). Always ≥ 1.
    pub max_stack_trace_lines: usize,
}

impl ForwardingConfig {
    /// Literal label match against the configured set.
    pub fn level_allowed(&self, label: &str) -> bool {
        self.allowed_levels.contains(label)
    }
}

/// Typed configuration for the forwarder.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Fixed destination for all forwarded events.
    pub error_group: ChatId,
    pub forwarding: ForwardingConfig,
    /// Deadline for a single Telegram delivery.
    pub send_timeout: Duration,
    /// Depth of the bounded handoff queue between `handle` and the
    /// delivery worker.
    pub queue_capacity: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let enabled = env_bool("TELEGRAM_LOGGING_ENABLED").unwrap_or(false);

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if enabled && telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required when logging is enabled"
                    .to_string(),
            ));
        }

        let error_group = match env_i64("TELEGRAM_ERROR_GROUP_ID") {
            Some(id) => ChatId(id),
            None if enabled => {
                return Err(Error::Config(
                    "TELEGRAM_ERROR_GROUP_ID environment variable is required when logging is enabled"
                        .to_string(),
                ))
            }
            None => ChatId(0),
        };

        // Labels are kept verbatim; see `ForwardingConfig::allowed_levels`.
        let allowed_levels: HashSet<String> = parse_csv(
            env_str("TELEGRAM_LOGGING_LEVELS").or_else(|| Some("ERROR".to_string())),
        )
        .into_iter()
        .collect();

        let include_stack_trace = env_bool("TELEGRAM_INCLUDE_STACK_TRACE").unwrap_or(true);
        let max_stack_trace_lines = env_usize("TELEGRAM_MAX_STACK_TRACE_LINES").unwrap_or(10);
        if max_stack_trace_lines == 0 {
            return Err(Error::Config(
                "TELEGRAM_MAX_STACK_TRACE_LINES must be at least 1".to_string(),
            ));
        }

        let send_timeout =
            Duration::from_millis(env_u64("TELEGRAM_SEND_TIMEOUT_MS").unwrap_or(10_000));

        let queue_capacity = env_usize("FORWARD_QUEUE_CAPACITY").unwrap_or(256);
        if queue_capacity == 0 {
            return Err(Error::Config(
                "FORWARD_QUEUE_CAPACITY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            telegram_bot_token,
            error_group,
            forwarding: ForwardingConfig {
                enabled,
                allowed_levels,
                include_stack_trace,
                max_stack_trace_lines,
            },
            send_timeout,
            queue_capacity,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

/// CSV split that trims whitespace but preserves case.
fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_preserves_case_and_trims() {
        let parsed = parse_csv(Some(" ERROR, warn ,,FATAL ".to_string()));
        assert_eq!(parsed, vec!["ERROR", "warn", "FATAL"]);
    }

    #[test]
    fn csv_of_nothing_is_empty() {
        assert!(parse_csv(None).is_empty());
        assert!(parse_csv(Some(" , ".to_string())).is_empty());
    }

    #[test]
    fn level_match_is_literal() {
        let cfg = ForwardingConfig {
            enabled: true,
            allowed_levels: ["ERROR".to_string()].into_iter().collect(),
            include_stack_trace: true,
            max_stack_trace_lines: 10,
        };

        assert!(cfg.level_allowed("ERROR"));
        // Case-sensitive, no severity ordering.
        assert!(!cfg.level_allowed("error"));
        assert!(!cfg.level_allowed("FATAL"));
        assert!(!cfg.level_allowed("WARN"));
    }
}
