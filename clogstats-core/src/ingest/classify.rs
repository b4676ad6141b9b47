//! Message classification and participant resolution
//!
//! WeeChat writes a marker in the prefix column for anything that is not a
//! regular message. Every other prefix is the sender's nick.

use crate::types::MessageType;
use once_cell::sync::Lazy;
use regex::Regex;

/// Mode indicators WeeChat puts in front of a nick (voice, halfop, op, ...).
const MODE_PREFIXES: [char; 5] = ['+', '%', '@', '~', '&'];

/// ANSI color/control escapes that WeeChat sometimes leaves in the log.
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\x1B[@-_]|[\x80-\x9F])[0-?]*[ -/]*[@-~]").expect("ANSI pattern is valid")
});

/// Remove terminal escape sequences from a field.
pub fn strip_ansi(field: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(field, "")
}

/// Classify a line by its (escape-stripped) prefix.
///
/// Never fails: a prefix that is not a known marker is a nick.
pub fn classify(prefix: &str) -> MessageType {
    match prefix {
        "=!=" => MessageType::Error,
        "--" => MessageType::Network,
        " *" => MessageType::Action,
        "-->" => MessageType::Join,
        "<--" => MessageType::Quit,
        "" => MessageType::Other,
        _ => MessageType::Message,
    }
}

/// Strip one leading mode indicator from a nick.
pub fn strip_mode_prefix(nick: &str) -> &str {
    nick.strip_prefix(&MODE_PREFIXES[..]).unwrap_or(nick)
}

/// Resolve who a line is attributed to.
///
/// Regular messages carry the nick in the prefix; actions, joins and quits
/// carry it as the first word of the body.
pub fn resolve_participant(msg_type: MessageType, prefix: &str, body: &str) -> Option<String> {
    let raw = match msg_type {
        MessageType::Message => prefix.to_string(),
        MessageType::Action | MessageType::Join | MessageType::Quit => {
            let first = body.split_whitespace().next()?;
            strip_ansi(first).into_owned()
        }
        MessageType::Network | MessageType::Error | MessageType::Other => return None,
    };

    let nick = strip_mode_prefix(&raw);
    if nick.is_empty() {
        None
    } else {
        Some(nick.to_string())
    }
}
