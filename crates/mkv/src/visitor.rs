use std::collections::{BTreeMap, HashMap};

use crate::{constant, MkvElement, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

/// Receives every element a [`crate::StreamingMkvReader`] produces, in stream
/// order.
///
/// Returning an error aborts the reader and the error is handed back to the
/// caller of `apply`.
pub trait MkvElementVisitor {
    fn visit(&mut self, element: &MkvElement) -> Result<Visit>;
}

impl<F> MkvElementVisitor for F
where
    F: FnMut(&MkvElement) -> Result<Visit>,
{
    fn visit(&mut self, element: &MkvElement) -> Result<Visit> {
        self(element)
    }
}

/// Counts elements by id. Master elements are counted once, on start.
#[derive(Debug, Default)]
pub struct CountVisitor {
    counts: HashMap<u32, usize>,
}

impl CountVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, id: u32) -> usize {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn frames(&self) -> usize {
        self.count(constant::SIMPLE_BLOCK) + self.count(constant::BLOCK)
    }

    /// Counts keyed by element name, sorted.
    pub fn by_name(&self) -> BTreeMap<&'static str, usize> {
        let mut result = BTreeMap::new();
        for (id, count) in &self.counts {
            let name = constant::lookup(*id)
                .map(|def| def.name)
                .unwrap_or("Unknown");
            *result.entry(name).or_insert(0) += count;
        }
        result
    }
}

impl MkvElementVisitor for CountVisitor {
    fn visit(&mut self, element: &MkvElement) -> Result<Visit> {
        if !matches!(element, MkvElement::MasterEnd(_)) {
            *self.counts.entry(element.id()).or_insert(0) += 1;
        }
        Ok(Visit::Continue)
    }
}

pub const TAG_FRAGMENT_NUMBER: &str = "AWS_KINESISVIDEO_FRAGMENT_NUMBER";
pub const TAG_SERVER_TIMESTAMP: &str = "AWS_KINESISVIDEO_SERVER_TIMESTAMP";
pub const TAG_PRODUCER_TIMESTAMP: &str = "AWS_KINESISVIDEO_PRODUCER_TIMESTAMP";

/// Tags attached to one fragment of an archived media payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentMetadata {
    pub tags: BTreeMap<String, String>,
}

impl FragmentMetadata {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn fragment_number(&self) -> Option<&str> {
        self.get(TAG_FRAGMENT_NUMBER)
    }

    pub fn server_timestamp(&self) -> Option<&str> {
        self.get(TAG_SERVER_TIMESTAMP)
    }

    pub fn producer_timestamp(&self) -> Option<&str> {
        self.get(TAG_PRODUCER_TIMESTAMP)
    }
}

/// Collects `SimpleTag` name/value pairs, one [`FragmentMetadata`] per
/// fragment.
///
/// A `Tags` block carrying a fragment number starts a new fragment; blocks
/// without one are merged into the current fragment.
#[derive(Debug, Default)]
pub struct FragmentMetadataVisitor {
    fragments: Vec<FragmentMetadata>,
    current: BTreeMap<String, String>,
    tag_name: Option<String>,
}

impl FragmentMetadataVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragments(&self) -> &[FragmentMetadata] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<FragmentMetadata> {
        self.fragments
    }

    fn flush(&mut self) {
        let tags = std::mem::take(&mut self.current);
        if tags.is_empty() {
            return;
        }

        match self.fragments.last_mut() {
            Some(last) if !tags.contains_key(TAG_FRAGMENT_NUMBER) => last.tags.extend(tags),
            _ => self.fragments.push(FragmentMetadata { tags }),
        }
    }
}

impl MkvElementVisitor for FragmentMetadataVisitor {
    fn visit(&mut self, element: &MkvElement) -> Result<Visit> {
        match (element, element.id()) {
            (MkvElement::Data { .. }, constant::TAG_NAME) => {
                self.tag_name = element.as_str().map(str::to_string);
            }
            (MkvElement::Data { .. }, constant::TAG_STRING) => {
                if let (Some(name), Some(value)) = (self.tag_name.take(), element.as_str()) {
                    self.current.insert(name, value.to_string());
                }
            }
            (MkvElement::MasterEnd(_), constant::SIMPLE_TAG) => self.tag_name = None,
            (MkvElement::MasterEnd(_), constant::TAGS) => self.flush(),
            _ => {}
        }
        Ok(Visit::Continue)
    }
}
