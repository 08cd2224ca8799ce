pub mod order;
pub mod path;

pub use path::{parse_field_path, FieldPath, PathDelimiter, UNCATEGORIZED};

use crate::error::{Warning, WarningKind};
use crate::model::FieldRecord;
use crate::reconcile::{is_boolean_field, is_suspicious_value};
use order::{alphabetical, first_appearance, merge_order};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Key of the aggregate options/selections summary field.
pub const OPTIONS_SUMMARY_KEY: &str = "options_listing";
/// Dedicated section for the options summary.
pub const OPTIONS_SECTION: &str = "Option Listing";
/// Label of the options summary when the mapping gives none.
pub const OPTIONS_LABEL: &str = "Additional Quoted Options";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPathEntry {
    pub key: String,
    pub path: String,
}

/// Ordered field-key -> path mapping.
#[derive(Debug, Clone, Default)]
pub struct FieldPathMapping {
    delimiter: PathDelimiter,
    entries: Vec<FieldPathEntry>,
    index: HashMap<String, usize>,
}

impl FieldPathMapping {
    /// Build from entries in canonical order. A repeated key keeps its first
    /// position and takes the later path.
    pub fn new(delimiter: PathDelimiter, entries: impl IntoIterator<Item = FieldPathEntry>) -> Self {
        let mut mapping = FieldPathMapping {
            delimiter,
            ..Default::default()
        };
        for entry in entries {
            match mapping.index.get(&entry.key) {
                Some(&i) => mapping.entries[i].path = entry.path,
                None => {
                    mapping.index.insert(entry.key.clone(), mapping.entries.len());
                    mapping.entries.push(entry);
                }
            }
        }
        mapping
    }

    pub fn delimiter(&self) -> PathDelimiter {
        self.delimiter
    }

    pub fn entries(&self) -> &[FieldPathEntry] {
        &self.entries
    }

    pub fn path(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].path.as_str())
    }

    /// Position of the key in canonical order.
    pub fn rank(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Section/group/field order of a rendered form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlLayout {
    pub sections: Vec<HtmlSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlSection {
    pub name: String,
    pub groups: Vec<HtmlGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlGroup {
    /// Group title; `None` for fields placed directly in the section.
    pub title: Option<String>,
    pub field_keys: Vec<String>,
}

impl HtmlLayout {
    fn section(&self, name: &str) -> Option<&HtmlSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_rank(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Position of the first group with this title within a section.
    pub fn group_rank(&self, section: &str, title: &str) -> Option<usize> {
        self.section(section)?
            .groups
            .iter()
            .position(|g| g.title.as_deref() == Some(title))
    }

    /// Position of a field among all fields of a section, in document order.
    pub fn field_rank(&self, section: &str, key: &str) -> Option<usize> {
        self.section(section)?
            .groups
            .iter()
            .flat_map(|g| g.field_keys.iter())
            .position(|k| k == key)
    }

    /// Section and group title of the first occurrence of a field.
    pub fn locate(&self, key: &str) -> Option<(&str, Option<&str>)> {
        self.sections.iter().find_map(|s| {
            s.groups
                .iter()
                .find(|g| g.field_keys.iter().any(|k| k == key))
                .map(|g| (s.name.as_str(), g.title.as_deref()))
        })
    }
}

/// Which source is authoritative for section and subsection order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Editing an existing record: HTML order first, spreadsheet order second.
    #[default]
    CurrentForm,
    /// Choosing fields to add: spreadsheet order only.
    Catalogue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPlacement {
    pub key: String,
    pub section: String,
    pub subsection: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutField {
    pub key: String,
    pub label: String,
    pub value: String,
    pub is_boolean: bool,
    pub suspicious: bool,
    /// Position within its subsection.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSubsection {
    /// `None` holds the fields placed directly in the section.
    pub name: Option<String>,
    pub fields: Vec<LayoutField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSection {
    pub name: String,
    pub subsections: Vec<LayoutSubsection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub sections: Vec<LayoutSection>,
    pub warnings: Vec<Warning>,
}

impl FieldLayout {
    pub fn field_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.subsections)
            .map(|sub| sub.fields.len())
            .sum()
    }

    /// Field keys in display order.
    pub fn keys(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| &s.subsections)
            .flat_map(|sub| &sub.fields)
            .map(|f| f.key.as_str())
            .collect()
    }
}

/// Resolves placement and display order of fields.
///
/// Two ordering sources feed it: the canonical field-path mapping
/// (spreadsheet order) and, optionally, the section/group/field order of the
/// rendered HTML form. The result is one [`FieldLayout`].
pub struct FieldHierarchyResolver<'a> {
    mapping: &'a FieldPathMapping,
    html: Option<&'a HtmlLayout>,
    parsed: HashMap<&'a str, FieldPath>,
    section_rank: HashMap<String, usize>,
    subsection_rank: HashMap<(String, String), usize>,
}

impl<'a> FieldHierarchyResolver<'a> {
    pub fn new(mapping: &'a FieldPathMapping, html: Option<&'a HtmlLayout>) -> Self {
        let parsed: HashMap<&str, FieldPath> = mapping
            .entries()
            .iter()
            .filter_map(|e| parse_field_path(&e.path, mapping.delimiter()).map(|p| (e.key.as_str(), p)))
            .collect();

        let parsed_ref = &parsed;
        let in_order = move || {
            mapping
                .entries()
                .iter()
                .filter_map(move |e| parsed_ref.get(e.key.as_str()))
        };
        let section_rank = first_appearance(in_order().map(|p| p.section.clone()));
        let subsection_rank = first_appearance(
            in_order().filter_map(|p| p.subsection.clone().map(|sub| (p.section.clone(), sub))),
        );

        FieldHierarchyResolver {
            mapping,
            html,
            parsed,
            section_rank,
            subsection_rank,
        }
    }

    /// Section, subsection and label of one field.
    ///
    /// The options summary always lands in its own section. Other fields use
    /// their mapping path, then their position in the HTML form, then
    /// "Uncategorized". A mapping path with fewer than two components yields
    /// a warning.
    pub fn place(&self, key: &str) -> (FieldPlacement, Option<Warning>) {
        let placement = |section: &str, subsection: Option<&str>, label: &str| FieldPlacement {
            key: key.to_string(),
            section: section.to_string(),
            subsection: subsection.map(str::to_string),
            label: label.to_string(),
        };

        if key == OPTIONS_SUMMARY_KEY {
            let label = self.parsed.get(key).map_or(OPTIONS_LABEL, |p| p.label.as_str());
            return (placement(OPTIONS_SECTION, None, label), None);
        }

        if let Some(path) = self.mapping.path(key) {
            return match self.parsed.get(key) {
                Some(p) => (placement(&p.section, p.subsection.as_deref(), &p.label), None),
                None => {
                    warn!(key, path, "field path has fewer than two components");
                    let warning = Warning::new(
                        WarningKind::HierarchyPathMalformed,
                        key,
                        format!("path '{path}' has fewer than two components"),
                    );
                    (placement(UNCATEGORIZED, None, key), Some(warning))
                }
            };
        }

        if let Some((section, title)) = self.html.and_then(|h| h.locate(key)) {
            return (placement(section, title, key), None);
        }

        (placement(UNCATEGORIZED, None, key), None)
    }

    /// Lay out the fields of a record.
    pub fn layout(&self, record: &FieldRecord, mode: LayoutMode) -> FieldLayout {
        let fields = record.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        self.build(fields, mode)
    }

    /// Lay out the mapping's fields that the record does not have yet,
    /// in spreadsheet order.
    pub fn catalogue(&self, record: &FieldRecord) -> FieldLayout {
        let missing = self
            .mapping
            .entries()
            .iter()
            .filter(|e| !record.contains_key(&e.key))
            .map(|e| (e.key.as_str(), ""));
        self.build(missing, LayoutMode::Catalogue)
    }

    fn build<'r>(&self, fields: impl Iterator<Item = (&'r str, &'r str)>, mode: LayoutMode) -> FieldLayout {
        let mut warnings = Vec::new();
        let mut sections: Vec<LayoutSection> = Vec::new();

        for (key, value) in fields {
            let (placement, warning) = self.place(key);
            warnings.extend(warning);

            let section = match sections.iter().position(|s| s.name == placement.section) {
                Some(i) => &mut sections[i],
                None => {
                    sections.push(LayoutSection {
                        name: placement.section.clone(),
                        subsections: Vec::new(),
                    });
                    let last = sections.len() - 1;
                    &mut sections[last]
                }
            };
            let subsection = match section.subsections.iter().position(|s| s.name == placement.subsection) {
                Some(i) => &mut section.subsections[i],
                None => {
                    section.subsections.push(LayoutSubsection {
                        name: placement.subsection.clone(),
                        fields: Vec::new(),
                    });
                    let last = section.subsections.len() - 1;
                    &mut section.subsections[last]
                }
            };
            subsection.fields.push(LayoutField {
                key: key.to_string(),
                label: placement.label,
                value: value.to_string(),
                is_boolean: is_boolean_field(key, Some(value)),
                suspicious: is_suspicious_value(key, value),
                rank: 0,
            });
        }

        for section in &mut sections {
            for subsection in &mut section.subsections {
                self.order_fields(&section.name, &mut subsection.fields, mode);
            }
            self.order_subsections(&section.name, &mut section.subsections, mode);
        }
        self.order_sections(&mut sections, mode);

        FieldLayout { sections, warnings }
    }

    fn html_for(&self, mode: LayoutMode) -> Option<&HtmlLayout> {
        match mode {
            LayoutMode::CurrentForm => self.html,
            LayoutMode::Catalogue => None,
        }
    }

    fn order_sections(&self, sections: &mut [LayoutSection], mode: LayoutMode) {
        let html = self.html_for(mode);
        merge_order(
            sections,
            |s| html.and_then(|h| h.section_rank(&s.name)),
            |s| self.section_rank.get(&s.name).copied(),
            |a, b| alphabetical(&a.name, &b.name),
        );
    }

    /// Direct fields (no subsection) always come first.
    fn order_subsections(&self, section: &str, subsections: &mut [LayoutSubsection], mode: LayoutMode) {
        let html = self.html_for(mode);
        merge_order(
            subsections,
            |s| match &s.name {
                None => Some(0),
                Some(name) => html.and_then(|h| h.group_rank(section, name)).map(|r| r + 1),
            },
            |s| {
                s.name
                    .as_ref()
                    .and_then(|name| self.subsection_rank.get(&(section.to_string(), name.clone())))
                    .copied()
            },
            |a, b| alphabetical(a.name.as_deref().unwrap_or(""), b.name.as_deref().unwrap_or("")),
        );
    }

    /// The options summary leads its container.
    fn order_fields(&self, section: &str, fields: &mut [LayoutField], mode: LayoutMode) {
        let html = self.html_for(mode);
        merge_order(
            fields,
            |f| {
                if f.key == OPTIONS_SUMMARY_KEY {
                    Some(0)
                } else {
                    html.and_then(|h| h.field_rank(section, &f.key)).map(|r| r + 1)
                }
            },
            |f| self.mapping.rank(&f.key),
            |a, b| alphabetical(&a.label, &b.label).then_with(|| a.key.cmp(&b.key)),
        );
        for (i, field) in fields.iter_mut().enumerate() {
            field.rank = i;
        }
    }
}
