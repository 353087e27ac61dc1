use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::FilterError;

/// A filter-bearing query parameter understood by the listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Month,
    Group,
    Kind,
    StudentQuery,
    Status,
    Page,
}

impl Field {
    /// Every field, in serialization order
    pub const ALL: [Field; 6] = [
        Field::Month,
        Field::Group,
        Field::Kind,
        Field::StudentQuery,
        Field::Status,
        Field::Page,
    ];

    /// Every field except `Page`
    pub const FILTERS: [Field; 5] = [
        Field::Month,
        Field::Group,
        Field::Kind,
        Field::StudentQuery,
        Field::Status,
    ];

    /// Name of the query parameter carrying this field
    pub fn param(self) -> &'static str {
        match self {
            Field::Month => "mes",
            Field::Group => "turma",
            Field::Kind => "tipo",
            Field::StudentQuery => "estudante",
            Field::Status => "status",
            Field::Page => "page",
        }
    }

    pub fn from_param(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.param() == name)
    }

    pub fn is_filter(self) -> bool {
        self != Field::Page
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}

impl FromStr for Field {
    type Err = FilterError;

    /// Accepts the query parameter name or the English name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Some(field) = Field::from_param(&lower) {
            return Ok(field);
        }
        match lower.as_str() {
            "month" => Ok(Field::Month),
            "group" => Ok(Field::Group),
            "kind" | "type" => Ok(Field::Kind),
            "student" | "student_query" => Ok(Field::StudentQuery),
            _ => Err(FilterError::UnknownField(s.to_string())),
        }
    }
}

/// Trim a raw value; empty after trimming means "absent"
pub fn normalize_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a page number. Zero, negatives and garbage are treated as absent.
pub fn parse_page(raw: &str) -> Option<NonZeroU32> {
    raw.trim().parse::<u32>().ok().and_then(NonZeroU32::new)
}

/// Active filters of a listing page, as carried by its query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(rename = "mes", default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    #[serde(rename = "turma", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "estudante", default, skip_serializing_if = "Option::is_none")]
    pub student_query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Absent means page 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<NonZeroU32>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(mut self, month: &str) -> Self {
        self.set(Field::Month, month);
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.set(Field::Group, group);
        self
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.set(Field::Kind, kind);
        self
    }

    pub fn with_student_query(mut self, query: &str) -> Self {
        self.set(Field::StudentQuery, query);
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.set(Field::Status, status);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = NonZeroU32::new(page);
        self
    }

    /// Current value of `field` in its query-string form
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::Page => self.page.map(|p| p.to_string()),
            _ => self.text_slot(field).cloned().flatten(),
        }
    }

    /// Set `field` from a raw value, normalizing it first.
    /// An empty or malformed value clears the field.
    pub fn set(&mut self, field: Field, raw: &str) {
        match self.text_slot_mut(field) {
            Some(slot) => *slot = normalize_value(raw),
            None => self.page = parse_page(raw),
        }
    }

    pub fn clear(&mut self, field: Field) {
        match self.text_slot_mut(field) {
            Some(slot) => *slot = None,
            None => self.page = None,
        }
    }

    pub fn effective_page(&self) -> u32 {
        self.page.map(NonZeroU32::get).unwrap_or(1)
    }

    /// True when at least one filter (not counting the page) is set
    pub fn has_filters(&self) -> bool {
        Field::FILTERS
            .iter()
            .any(|f| matches!(self.text_slot(*f), Some(Some(_))))
    }

    /// Present fields with their query-string values, in serialization order
    pub fn pairs(&self) -> Vec<(Field, String)> {
        Field::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f, v)))
            .collect()
    }

    fn text_slot(&self, field: Field) -> Option<&Option<String>> {
        match field {
            Field::Month => Some(&self.month),
            Field::Group => Some(&self.group),
            Field::Kind => Some(&self.kind),
            Field::StudentQuery => Some(&self.student_query),
            Field::Status => Some(&self.status),
            Field::Page => None,
        }
    }

    fn text_slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        match field {
            Field::Month => Some(&mut self.month),
            Field::Group => Some(&mut self.group),
            Field::Kind => Some(&mut self.kind),
            Field::StudentQuery => Some(&mut self.student_query),
            Field::Status => Some(&mut self.status),
            Field::Page => None,
        }
    }
}
