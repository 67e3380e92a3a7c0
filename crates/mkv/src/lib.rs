//! Streaming reader for Matroska (EBML) byte streams such as the payload of an
//! archived media request.
//!
//! The reader does not build a tree. It walks the stream once and pushes each
//! element to a [`MkvElementVisitor`].

pub mod constant;
mod ebml;
mod element;
mod error;
mod reader;
mod visitor;

pub use element::{ElementHeader, MkvElement};
pub use error::*;
pub use reader::{StreamingMkvReader, DEFAULT_MAX_CONTENT_SIZE};
pub use visitor::*;
