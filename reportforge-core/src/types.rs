//! Domain types for the report document model.
//!
//! Page and visual ids are opaque tokens that double as folder names on
//! disk. Visual titles are display strings: mutable, not guaranteed unique,
//! and usable only as a first-match lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable opaque identifier of a page (its folder name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub String);

impl PageId {
    /// Allocate a fresh id in the format the designer emits.
    pub fn allocate() -> Self {
        Self(new_token())
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Stable opaque identifier of a visual (its folder name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualId(pub String);

impl VisualId {
    /// Allocate a fresh id in the format the designer emits.
    pub fn allocate() -> Self {
        Self(new_token())
    }
}

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for VisualId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VisualId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// 20-char dash-free UUID fragment, matching the id shape the interactive
/// designer writes into `name` fields.
fn new_token() -> String {
    let mut simple = uuid::Uuid::new_v4().simple().to_string();
    simple.truncate(20);
    simple
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether a field reference points at a column or a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Column,
    Measure,
}

impl FieldKind {
    /// The wrapper key used inside a visual's query tree.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Column => "Column",
            FieldKind::Measure => "Measure",
        }
    }
}

/// Query slot a field can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindingSlot {
    Category,
    #[default]
    Values,
    Y,
}

impl BindingSlot {
    /// The `queryState` key for this slot.
    pub fn as_str(self) -> &'static str {
        match self {
            BindingSlot::Category => "Category",
            BindingSlot::Values => "Values",
            BindingSlot::Y => "Y",
        }
    }
}

impl std::str::FromStr for BindingSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "category" => Ok(BindingSlot::Category),
            "value" | "values" => Ok(BindingSlot::Values),
            "y" => Ok(BindingSlot::Y),
            other => Err(format!(
                "unknown binding slot '{other}'; expected: category, values, y"
            )),
        }
    }
}

/// The fixed catalogue of visual kinds this tool can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Card,
    Textbox,
    BarChart,
}

impl VisualKind {
    /// The `visualType` value written into the document.
    pub fn visual_type(self) -> &'static str {
        match self {
            VisualKind::Card => "card",
            VisualKind::Textbox => "shape",
            VisualKind::BarChart => "clusteredBarChart",
        }
    }
}

impl fmt::Display for VisualKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualKind::Card => write!(f, "card"),
            VisualKind::Textbox => write!(f, "textbox"),
            VisualKind::BarChart => write!(f, "bar-chart"),
        }
    }
}

impl std::str::FromStr for VisualKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "card" => Ok(VisualKind::Card),
            "textbox" => Ok(VisualKind::Textbox),
            "bar-chart" | "barchart" => Ok(VisualKind::BarChart),
            other => Err(format!(
                "unknown visual kind '{other}'; expected: card, textbox, bar-chart"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A structured pointer to a table/column-or-measure pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub kind: FieldKind,
    /// Owning table name (`Entity` in the query tree).
    pub entity: String,
    /// Column or measure name (`Property` in the query tree).
    pub property: String,
}

impl FieldRef {
    pub fn column(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Column,
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn measure(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Measure,
            entity: entity.into(),
            property: property.into(),
        }
    }

    /// `Table.Property`, the `queryRef` form.
    pub fn query_ref(&self) -> String {
        format!("{}.{}", self.entity, self.property)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.entity, self.property)
    }
}

/// Pixel placement of a visual on its page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// One entry in the merged page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub id: PageId,
    pub display_name: String,
}

/// Display metadata of one visual, parsed defensively from its document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualSummary {
    pub id: VisualId,
    /// Title literal, `"Untitled"` when the document carries none, or the id
    /// when the document failed to parse.
    pub title: String,
    pub visual_type: String,
    pub position: Position,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn allocated_ids_are_20_chars_and_unique() {
        let a = PageId::allocate();
        let b = PageId::allocate();
        assert_eq!(a.0.len(), 20);
        assert!(!a.0.contains('-'));
        assert_ne!(a, b);
    }

    #[test]
    fn field_ref_query_ref() {
        let f = FieldRef::measure("Sales", "TotalRevenue");
        assert_eq!(f.query_ref(), "Sales.TotalRevenue");
        assert_eq!(f.to_string(), "Sales[TotalRevenue]");
    }

    #[rstest]
    #[case("card", VisualKind::Card)]
    #[case("textbox", VisualKind::Textbox)]
    #[case("bar-chart", VisualKind::BarChart)]
    #[case("BarChart", VisualKind::BarChart)]
    fn visual_kind_parses(#[case] input: &str, #[case] expected: VisualKind) {
        assert_eq!(input.parse::<VisualKind>().unwrap(), expected);
    }

    #[test]
    fn visual_kind_rejects_unknown() {
        assert!("pie".parse::<VisualKind>().is_err());
    }

    #[rstest]
    #[case("category", BindingSlot::Category)]
    #[case("value", BindingSlot::Values)]
    #[case("Values", BindingSlot::Values)]
    #[case("y", BindingSlot::Y)]
    fn binding_slot_parses(#[case] input: &str, #[case] expected: BindingSlot) {
        assert_eq!(input.parse::<BindingSlot>().unwrap(), expected);
    }

    #[test]
    fn position_deserializes_with_missing_fields() {
        let pos: Position = serde_json::from_str(r#"{"x": 10, "y": 20}"#).unwrap();
        assert_eq!(pos.x, 10.0);
        assert_eq!(pos.width, 0.0);
    }
}
