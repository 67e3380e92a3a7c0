#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid EBML element id leading byte: {0:#04x}")]
    InvalidElementId(u8),

    #[error("Invalid EBML size leading byte: {0:#04x}")]
    InvalidSize(u8),

    #[error("Data element {0:#x} has unknown size")]
    UnknownSizeData(u32),

    #[error("Element {id:#x} at offset {offset} runs past the end of its parent at {parent_end}")]
    ElementOverflow {
        id: u32,
        offset: u64,
        parent_end: u64,
    },

    #[error("Unexpected end of stream")]
    UnexpectedEof,

    #[error("Visitor failed: {0}")]
    VisitError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    pub fn visit(message: impl Into<String>) -> Self {
        Self::VisitError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
