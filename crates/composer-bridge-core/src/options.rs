use serde::{Deserialize, Serialize};

/// How canonical HTML is turned into display content.
///
/// The defaults reproduce the attributed-string rendering used on mobile:
/// `"\t1.\t"` / `"\t•\t"` list prefixes and a non-breaking space standing in
/// for empty paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Marker for unordered list items
    pub bullet: String,
    /// Repeated once per list nesting level before the marker
    pub list_indent: String,
    /// Appended to the item number in ordered lists
    pub ordered_suffix: String,
    /// Between the marker and the item text
    pub marker_separator: String,
    /// Rendered inside empty paragraphs, quotes and code blocks; `None` leaves them empty
    ///
    /// Serialized as a plain string, with `""` standing for `None`.
    #[serde(with = "placeholder")]
    pub empty_block_placeholder: Option<String>,
    /// Rendered at the start of every line inside a quote; empty disables it
    pub quote_prefix: String,
    /// Logical width of a mention pill
    pub mention_width: usize,
    /// Treat plain `<a>` links to matrix.to user/room permalinks as mentions
    pub detect_permalink_mentions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bullet: "•".to_string(),
            list_indent: "\t".to_string(),
            ordered_suffix: ".".to_string(),
            marker_separator: "\t".to_string(),
            empty_block_placeholder: Some("\u{a0}".to_string()),
            quote_prefix: String::new(),
            mention_width: 1,
            detect_permalink_mentions: true,
        }
    }
}

/// Behaviour switches for [`SelectionReconciler`](crate::reconciler::SelectionReconciler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerOptions {
    /// Ignore a selection report that is the reverse of the last known one
    pub suppress_mirrored_selection: bool,
    /// Reopen an active IME composition after the content is replaced
    pub reopen_composition_after_replace: bool,
    /// Start with an action log attached
    pub record_actions: bool,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            suppress_mirrored_selection: true,
            reopen_composition_after_replace: true,
            record_actions: false,
        }
    }
}

mod placeholder {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok((!value.is_empty()).then_some(value))
    }
}
