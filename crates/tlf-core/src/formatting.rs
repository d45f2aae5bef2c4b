//! Message building for Telegram HTML parse mode.
//!
//! Telegram HTML supports only a small subset of tags; forwarded messages
//! use `<b>` for the header lines and `<pre>` for body and stacktrace.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::ForwardingConfig;
use crate::domain::{ErrorChain, LogEvent};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Build the forwarded message for one event.
///
/// Header: severity, logger name, UTC timestamp. Body: the rendered
/// message, escaped, in a `<pre>` block. When configured and the event
/// carries an error chain, a stacktrace section follows.
pub fn build_message(event: &LogEvent, cfg: &ForwardingConfig) -> String {
    let mut out = String::new();

    out.push_str("🚨 <b>");
    out.push_str(event.level.as_str());
    out.push_str("</b>\n");

    out.push_str("📦 <b>");
    out.push_str(&event.logger);
    out.push_str("</b>\n");

    out.push_str("🕒 ");
    out.push_str(&format_timestamp(event.timestamp_millis));
    out.push_str("\n\n");

    out.push_str("<pre>");
    out.push_str(&escape_html(&event.message));
    out.push_str("</pre>");

    if cfg.include_stack_trace {
        if let Some(chain) = &event.error {
            out.push_str("\n\n");
            out.push_str(&build_stack_trace(chain, cfg.max_stack_trace_lines));
        }
    }

    out
}

/// First `max_lines` frames in original order, one per line. Frame text is
/// a pre-rendered source location and is emitted as-is.
fn build_stack_trace(chain: &ErrorChain, max_lines: usize) -> String {
    let mut out = String::from("<b>Stacktrace:</b>\n<pre>");
    for frame in chain.frames.iter().take(max_lines) {
        out.push_str(frame);
        out.push('\n');
    }
    out.push_str("</pre>");
    out
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}
