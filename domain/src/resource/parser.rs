//! Header/body extraction for agent resources.
//!
//! The header is a deliberately small subset of YAML:
//!
//! ```text
//! ---
//! id: reviewer_a
//! description: Finds weaknesses in the proposal
//! trigger_conditions:
//!   - a new proposal is posted
//!   - someone asks for a critique
//! ---
//! Body text (the agent's instructions)
//! ```
//!
//! Only syntactic extraction happens here. Whether required keys are present
//! is decided by the registry.

/// Header delimiter line
const DELIMITER: &str = "---";

/// A single header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// `key: value`
    Scalar(String),
    /// `key:` followed by `- item` lines, or `key: [a, b]`
    List(Vec<String>),
}

/// Ordered key/value pairs from a resource header.
///
/// A key that appears twice keeps only its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceHeader {
    entries: Vec<(String, HeaderValue)>,
}

impl ResourceHeader {
    fn insert(&mut self, key: String, value: HeaderValue) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
    }

    fn push_list_item(&mut self, key: &str, item: String) {
        if let Some((_, HeaderValue::List(items))) =
            self.entries.iter_mut().rev().find(|(k, _)| k == key)
        {
            items.push(item);
        }
    }

    /// Get the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a scalar value. Returns `None` for missing keys and list fields.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            HeaderValue::Scalar(s) => Some(s.as_str()),
            HeaderValue::List(_) => None,
        }
    }

    /// Get a list value. Returns `None` for missing keys and scalar fields.
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key)? {
            HeaderValue::List(items) => Some(items.as_slice()),
            HeaderValue::Scalar(_) => None,
        }
    }

    /// Keys in header order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of parsing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedResource {
    /// The text opened with a delimited header block.
    Header { header: ResourceHeader, body: String },
    /// No header delimiter pair was found; the resource is not an agent.
    NoHeader,
}

impl ParsedResource {
    pub fn is_header(&self) -> bool {
        matches!(self, ParsedResource::Header { .. })
    }
}

/// Split a resource into header and body.
///
/// Never fails: text without an opening `---` line, or with an opening line
/// but no closing one, yields [`ParsedResource::NoHeader`].
pub fn parse_resource(text: &str) -> ParsedResource {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return ParsedResource::NoHeader;
    };
    if first.trim_end() != DELIMITER {
        return ParsedResource::NoHeader;
    }

    let mut header_lines = Vec::new();
    let mut consumed = first.len();
    let mut closed = false;
    for line in lines {
        consumed += line.len();
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        header_lines.push(line.trim_end_matches(['\n', '\r']));
    }

    if !closed {
        return ParsedResource::NoHeader;
    }

    ParsedResource::Header {
        header: parse_header_lines(&header_lines),
        body: text[consumed..].to_string(),
    }
}

fn parse_header_lines(lines: &[&str]) -> ResourceHeader {
    let mut header = ResourceHeader::default();
    // Key of the list currently being filled, if any
    let mut open_list: Option<String> = None;

    for raw in lines {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = list_item(trimmed) {
            if let Some(key) = &open_list {
                header.push_list_item(key, unquote(item).to_string());
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            open_list = None;
            continue;
        };

        let key = key.trim().to_string();
        let value = value.trim();
        if key.is_empty() {
            open_list = None;
            continue;
        }

        if value.is_empty() {
            header.insert(key.clone(), HeaderValue::List(Vec::new()));
            open_list = Some(key);
        } else if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            let items = inner
                .split(',')
                .map(|s| unquote(s.trim()).to_string())
                .filter(|s| !s.is_empty())
                .collect();
            header.insert(key, HeaderValue::List(items));
            open_list = None;
        } else {
            header.insert(key, HeaderValue::Scalar(unquote(value).to_string()));
            open_list = None;
        }
    }

    header
}

fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        return Some("");
    }
    trimmed.strip_prefix("- ").map(str::trim)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
