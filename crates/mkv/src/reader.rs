use std::{
    collections::VecDeque,
    io::{self, Read},
};

use bytes::Bytes;

use crate::{
    constant::{self, ElementKind},
    ebml, ElementHeader, Error, MkvElement, MkvElementVisitor, Result, Visit,
};

pub const DEFAULT_MAX_CONTENT_SIZE: u64 = 32768;

const READ_CHUNK_SIZE: u64 = 64 * 1024;

struct OpenMaster {
    header: ElementHeader,
    end: Option<u64>,
    level: Option<u8>,
}

/// Pull parser over a Matroska byte stream.
///
/// Master elements are reported as a start/end pair, everything else as a
/// single data element. Elements written with an unknown size (as live
/// producers do for `Segment` and `Cluster`) are closed when an element of the
/// same or a higher level shows up, or when the stream ends.
pub struct StreamingMkvReader<R> {
    reader: R,
    max_content_size: u64,

    offset: u64,
    open: Vec<OpenMaster>,
    pending: VecDeque<MkvElement>,
    finished: bool,
}

impl<R> StreamingMkvReader<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        Self::with_max_content_size(reader, DEFAULT_MAX_CONTENT_SIZE)
    }

    /// Data elements larger than `max_content_size` are skipped, only their
    /// header is reported.
    pub fn with_max_content_size(reader: R, max_content_size: u64) -> Self {
        Self {
            reader,
            max_content_size,

            offset: 0,
            open: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Bytes consumed from the underlying reader so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Next element in stream order. After the first error the reader is
    /// done and every later call returns `Ok(None)`.
    pub fn next_element(&mut self) -> Result<Option<MkvElement>> {
        let result = self.read_element();
        if result.is_err() {
            self.finished = true;
            self.pending.clear();
            self.open.clear();
        }
        result
    }

    fn read_element(&mut self) -> Result<Option<MkvElement>> {
        loop {
            if let Some(element) = self.pending.pop_front() {
                return Ok(Some(element));
            }
            if self.finished {
                return Ok(None);
            }

            self.close_finished_masters();
            if !self.pending.is_empty() {
                continue;
            }

            let Some((id, id_len)) = ebml::read_id(&mut self.reader)? else {
                self.finish()?;
                continue;
            };
            let (data_size, size_len) = ebml::read_size(&mut self.reader)?;

            let def = constant::lookup(id);
            if let Some(level) = def.and_then(|def| def.level) {
                self.close_unknown_masters(level);
            }

            let header = ElementHeader {
                id,
                depth: self.open.len(),
                offset: self.offset,
                header_len: id_len + size_len,
                data_size,
            };
            self.offset += header.header_len as u64;
            self.check_nesting(&header)?;

            match def.map(|def| def.kind) {
                Some(ElementKind::Master) => {
                    self.open.push(OpenMaster {
                        header: header.clone(),
                        end: data_size.map(|size| self.offset.saturating_add(size)),
                        level: def.and_then(|def| def.level),
                    });
                    self.pending.push_back(MkvElement::MasterStart(header));
                }
                _ => {
                    let Some(size) = data_size else {
                        return Err(Error::UnknownSizeData(id));
                    };
                    let content = self.read_content(size)?;
                    self.pending
                        .push_back(MkvElement::Data { header, content });
                }
            }
        }
    }

    /// Feeds every element to `visitor` until the stream ends or the visitor
    /// asks to stop.
    pub fn apply<V>(&mut self, visitor: &mut V) -> Result<Visit>
    where
        V: MkvElementVisitor + ?Sized,
    {
        while let Some(element) = self.next_element()? {
            if visitor.visit(&element)? == Visit::Stop {
                log::debug!("Visitor stopped at offset {}", self.offset);
                return Ok(Visit::Stop);
            }
        }
        Ok(Visit::Continue)
    }

    fn read_content(&mut self, size: u64) -> Result<Option<Bytes>> {
        if size <= self.max_content_size {
            // declared size is untrusted
            let mut content = Vec::with_capacity(size.min(READ_CHUNK_SIZE) as usize);
            let read = (&mut self.reader).take(size).read_to_end(&mut content)? as u64;
            self.offset += read;
            if read < size {
                return Err(Error::UnexpectedEof);
            }
            Ok(Some(Bytes::from(content)))
        } else {
            let skipped = io::copy(&mut (&mut self.reader).take(size), &mut io::sink())?;
            self.offset += skipped;
            if skipped < size {
                return Err(Error::UnexpectedEof);
            }
            Ok(None)
        }
    }

    fn check_nesting(&self, header: &ElementHeader) -> Result<()> {
        let Some(parent_end) = self.open.last().and_then(|master| master.end) else {
            return Ok(());
        };

        let end = header
            .data_size
            .map_or(self.offset, |size| self.offset.saturating_add(size));
        if end > parent_end {
            return Err(Error::ElementOverflow {
                id: header.id,
                offset: header.offset,
                parent_end,
            });
        }
        Ok(())
    }

    fn close_finished_masters(&mut self) {
        while let Some(master) = self.open.last() {
            match master.end {
                Some(end) if end <= self.offset => self.close_top(),
                _ => break,
            }
        }
    }

    fn close_unknown_masters(&mut self, level: u8) {
        while let Some(master) = self.open.last() {
            match (master.end, master.level) {
                (None, Some(open_level)) if open_level >= level => self.close_top(),
                _ => break,
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(master) = self.open.pop() {
            self.pending.push_back(MkvElement::MasterEnd(master.header));
        }
    }

    fn finish(&mut self) -> Result<()> {
        let truncated = self
            .open
            .iter()
            .any(|master| master.end.is_some_and(|end| end > self.offset));
        if truncated {
            return Err(Error::UnexpectedEof);
        }

        while !self.open.is_empty() {
            self.close_top();
        }
        self.finished = true;
        Ok(())
    }
}

impl<R> Iterator for StreamingMkvReader<R>
where
    R: Read,
{
    type Item = Result<MkvElement>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element().transpose()
    }
}
