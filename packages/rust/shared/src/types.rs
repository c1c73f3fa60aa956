//! Row model for the Notion database that feeds the pipeline.
//!
//! Only the property kinds the pipeline reads are modelled; every other
//! Notion property type deserializes to [`PropertyValue::Other`].

use std::collections::HashMap;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// One span of a title or rich-text property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RichText {
    /// Unstyled text of the span.
    #[serde(default)]
    pub plain_text: String,
}

/// One option of a multi-select property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

/// A typed property value, tagged by Notion's `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    #[serde(other)]
    Other,
}

/// Text-bearing property kinds understood by [`Row::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    RichText,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::RichText => f.write_str("rich_text"),
        }
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// A database row (a Notion page) with its properties keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Row {
    /// Page id, used for updates and block appends.
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Row {
    /// Create an empty row with the given page id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: HashMap::new(),
        }
    }

    /// First span's plain text of a title or rich-text column.
    ///
    /// Total: a missing column, a column of another kind, or an empty span
    /// list all yield an empty string.
    pub fn text(&self, name: &str, kind: FieldKind) -> String {
        let spans = match (self.properties.get(name), kind) {
            (Some(PropertyValue::Title { title }), FieldKind::Title) => title,
            (Some(PropertyValue::RichText { rich_text }), FieldKind::RichText) => rich_text,
            _ => return String::new(),
        };
        spans
            .first()
            .map(|span| span.plain_text.clone())
            .unwrap_or_default()
    }

    /// Value of a checkbox column, `None` when absent or of another kind.
    pub fn checkbox(&self, name: &str) -> Option<bool> {
        match self.properties.get(name) {
            Some(PropertyValue::Checkbox { checkbox }) => Some(*checkbox),
            _ => None,
        }
    }

    /// Option names of a multi-select column, in stored order.
    pub fn multi_select(&self, name: &str) -> Vec<String> {
        match self.properties.get(name) {
            Some(PropertyValue::MultiSelect { multi_select }) => multi_select
                .iter()
                .map(|opt| opt.name.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Builder: set a title column to a single span.
    pub fn with_title(self, name: &str, text: &str) -> Self {
        self.with_property(
            name,
            PropertyValue::Title {
                title: spans(text),
            },
        )
    }

    /// Builder: set a rich-text column to a single span.
    pub fn with_rich_text(self, name: &str, text: &str) -> Self {
        self.with_property(
            name,
            PropertyValue::RichText {
                rich_text: spans(text),
            },
        )
    }

    /// Builder: set a checkbox column.
    pub fn with_checkbox(self, name: &str, checked: bool) -> Self {
        self.with_property(name, PropertyValue::Checkbox { checkbox: checked })
    }

    /// Builder: set a multi-select column.
    pub fn with_multi_select(self, name: &str, options: &[&str]) -> Self {
        let multi_select = options
            .iter()
            .map(|name| SelectOption {
                name: (*name).to_string(),
            })
            .collect();
        self.with_property(name, PropertyValue::MultiSelect { multi_select })
    }

    /// Builder: set an arbitrary property value.
    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }
}

/// Empty text maps to an empty span list, the way Notion returns blank cells.
fn spans(text: &str) -> Vec<RichText> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![RichText {
            plain_text: text.to_string(),
        }]
    }
}
