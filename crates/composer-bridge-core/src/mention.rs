//! Recognising mention anchors in canonical HTML.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// What a mention pill points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionKind {
    User,
    Room,
    /// The whole-room `@room` notification token
    AtRoom,
}

impl MentionKind {
    /// Value of a `data-mention-type` attribute.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(MentionKind::User),
            "room" => Some(MentionKind::Room),
            "at-room" | "at_room" | "atroom" => Some(MentionKind::AtRoom),
            _ => None,
        }
    }

    pub fn as_attribute(self) -> &'static str {
        match self {
            MentionKind::User => "user",
            MentionKind::Room => "room",
            MentionKind::AtRoom => "at-room",
        }
    }

    /// Label shown for a pill with neither text nor link.
    pub fn fallback_label(self) -> &'static str {
        match self {
            MentionKind::User => "@",
            MentionKind::Room => "#",
            MentionKind::AtRoom => "@room",
        }
    }
}

/// Classify a matrix.to permalink: `@user:server` is a user, `#alias:server`
/// or `!id:server` is a room. Event permalinks (with a trailing `/$event`)
/// are plain links.
pub fn detect_permalink(href: &str) -> Option<MentionKind> {
    static PERMALINK_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PERMALINK_REGEX.get_or_init(|| {
        Regex::new(r"^https://matrix\.to/#/([@#!])[^/?\s]+:[^/?\s]+(\?[^\s]*)?$")
            .expect("Invalid permalink regex")
    });

    let captures = regex.captures(href.trim())?;
    match captures.get(1)?.as_str() {
        "@" => Some(MentionKind::User),
        _ => Some(MentionKind::Room),
    }
}
