use std::path::Path;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::info;

use crate::error::QuoteError;
use crate::hierarchy::{HtmlGroup, HtmlLayout, HtmlSection};

/// Elements that never have a closing tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Script and style bodies are not markup and may contain bare `<`.
static RAW_TEXT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("invalid raw text pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Section,
    SectionHeader,
    SectionTitle,
    Group,
    GroupTitle,
    Field,
    Other,
}

struct Tag {
    name: String,
    classes: Vec<String>,
    field_name: Option<String>,
}

impl Tag {
    fn read(e: &BytesStart<'_>) -> Tag {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
        let mut classes = Vec::new();
        let mut field_name = None;

        for attr in e.html_attributes().flatten() {
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            let key = attr.key.as_ref();
            if key.eq_ignore_ascii_case(b"class") {
                classes = value.split_whitespace().map(str::to_string).collect();
            } else if key.eq_ignore_ascii_case(b"name") {
                field_name = Some(value);
            }
        }

        Tag {
            name,
            classes,
            field_name,
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn role(&self, parent: Option<Role>) -> Role {
        match self.name.as_str() {
            "section" if self.has_class("section") => Role::Section,
            "div" if self.has_class("section-header") => Role::SectionHeader,
            "h2" if parent == Some(Role::SectionHeader) => Role::SectionTitle,
            "div" if self.has_class("group") => Role::Group,
            "div" if self.has_class("group-title") => Role::GroupTitle,
            "label" if self.has_class("field") => Role::Field,
            _ => Role::Other,
        }
    }

    /// Key of an `input[name]` or `textarea[name]` element.
    fn input_key(&self) -> Option<&str> {
        match self.name.as_str() {
            "input" | "textarea" => self.field_name.as_deref().filter(|n| !n.is_empty()),
            _ => None,
        }
    }
}

struct Open {
    name: String,
    role: Role,
}

#[derive(Default)]
struct LayoutBuilder {
    layout: HtmlLayout,
    section: Option<HtmlSection>,
    group: Option<HtmlGroup>,
    capture: Option<String>,
}

impl LayoutBuilder {
    fn open(&mut self, role: Role) {
        match role {
            Role::Section => {
                self.finish_section();
                self.section = Some(HtmlSection {
                    name: String::new(),
                    groups: Vec::new(),
                });
            }
            Role::Group if self.section.is_some() => {
                self.finish_group();
                self.group = Some(HtmlGroup {
                    title: None,
                    field_keys: Vec::new(),
                });
            }
            Role::SectionTitle | Role::GroupTitle => self.capture = Some(String::new()),
            _ => {}
        }
    }

    fn close(&mut self, role: Role) {
        match role {
            Role::SectionTitle => {
                let text = self.take_capture();
                if let Some(section) = self.section.as_mut().filter(|s| s.name.is_empty()) {
                    section.name = text;
                }
            }
            Role::GroupTitle => {
                let text = self.take_capture();
                if let Some(group) = self.group.as_mut().filter(|g| g.title.is_none()) {
                    group.title = Some(text).filter(|t| !t.is_empty());
                }
            }
            Role::Group => self.finish_group(),
            Role::Section => self.finish_section(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(buf) = self.capture.as_mut() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(text);
        }
    }

    fn add_field(&mut self, key: &str) {
        if let Some(group) = self.group.as_mut() {
            group.field_keys.push(key.to_string());
        }
    }

    fn take_capture(&mut self) -> String {
        let raw = self.capture.take().unwrap_or_default();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn finish_group(&mut self) {
        if let (Some(group), Some(section)) = (self.group.take(), self.section.as_mut()) {
            if !group.field_keys.is_empty() {
                section.groups.push(group);
            }
        }
    }

    /// Unnamed sections and repeated section names are dropped.
    fn finish_section(&mut self) {
        self.finish_group();
        if let Some(section) = self.section.take() {
            if !section.name.is_empty() && self.layout.section_rank(&section.name).is_none() {
                self.layout.sections.push(section);
            }
        }
    }
}

/// Read the section/group/field order of a generated form.
///
/// Sections are `section.section` elements named by their
/// `div.section-header > h2`; groups are `div.group` with an optional
/// `div.group-title`; fields are the `input[name]`/`textarea[name]` inside a
/// `label.field`. Parsing is lenient: mismatched end tags and void elements
/// are accepted.
pub fn parse_html_layout(html: &str) -> Result<HtmlLayout, QuoteError> {
    let markup = RAW_TEXT_BLOCKS.replace_all(html, "");
    let mut reader = Reader::from_str(&markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.trim_text(true);

    let mut stack: Vec<Open> = Vec::new();
    let mut builder = LayoutBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = Tag::read(&e);
                if let Some(key) = tag.input_key().filter(|_| stack.iter().any(|o| o.role == Role::Field)) {
                    builder.add_field(key);
                }
                if VOID_ELEMENTS.contains(&tag.name.as_str()) {
                    continue;
                }
                let role = tag.role(stack.last().map(|o| o.role));
                builder.open(role);
                stack.push(Open { name: tag.name, role });
            }
            Ok(Event::Empty(e)) => {
                let tag = Tag::read(&e);
                if let Some(key) = tag.input_key().filter(|_| stack.iter().any(|o| o.role == Role::Field)) {
                    builder.add_field(key);
                }
                let role = tag.role(stack.last().map(|o| o.role));
                builder.open(role);
                builder.close(role);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if let Some(pos) = stack.iter().rposition(|o| o.name == name) {
                    for open in stack.drain(pos..).rev() {
                        builder.close(open.role);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                builder.text(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(QuoteError::OrderSourceParse(format!(
                    "HTML error at byte {}: {e}",
                    reader.error_position()
                )))
            }
        }
    }

    for open in stack.drain(..).rev() {
        builder.close(open.role);
    }
    builder.finish_section();
    Ok(builder.layout)
}

pub fn load_html_layout(path: &Path) -> Result<HtmlLayout, QuoteError> {
    let load_err = |reason: String| QuoteError::OrderSourceLoad {
        path: path.to_path_buf(),
        reason,
    };
    let html = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    let layout = parse_html_layout(&html).map_err(|e| load_err(e.to_string()))?;
    info!(path = %path.display(), sections = layout.sections.len(), "loaded form layout");
    Ok(layout)
}
