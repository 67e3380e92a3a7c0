use bytes::Bytes;

use crate::{constant, ebml};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHeader {
    pub id: u32,
    /// Number of open master elements enclosing this one.
    pub depth: usize,
    /// Offset of the first id byte in the stream.
    pub offset: u64,
    pub header_len: usize,
    /// `None` if the element was written with an unknown size.
    pub data_size: Option<u64>,
}

impl ElementHeader {
    pub fn name(&self) -> &'static str {
        constant::lookup(self.id)
            .map(|def| def.name)
            .unwrap_or("Unknown")
    }

    pub fn is_unknown_size(&self) -> bool {
        self.data_size.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MkvElement {
    MasterStart(ElementHeader),
    MasterEnd(ElementHeader),
    Data {
        header: ElementHeader,
        /// Missing when the element is larger than the reader's content limit.
        content: Option<Bytes>,
    },
}

impl MkvElement {
    pub fn header(&self) -> &ElementHeader {
        match self {
            Self::MasterStart(header) | Self::MasterEnd(header) => header,
            Self::Data { header, .. } => header,
        }
    }

    pub fn id(&self) -> u32 {
        self.header().id
    }

    pub fn content(&self) -> Option<&Bytes> {
        match self {
            Self::Data { content, .. } => content.as_ref(),
            _ => None,
        }
    }

    /// Content as UTF-8, with trailing NUL padding removed.
    pub fn as_str(&self) -> Option<&str> {
        let content = self.content()?;
        std::str::from_utf8(content)
            .ok()
            .map(|s| s.trim_end_matches('\0'))
    }

    pub fn as_unsigned(&self) -> Option<u64> {
        ebml::decode_unsigned(self.content()?)
    }
}
