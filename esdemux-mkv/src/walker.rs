//! Element header reading and scope bookkeeping for walking the EBML tree.
//!
//! Each parser loops `while cur.tell() < end`, reads a child header, handles
//! the IDs it knows and then seeks to the child's declared end, so the
//! cursor always lands on the next sibling regardless of how much of the
//! payload the handler consumed.

use crate::cursor::ElementCursor;
use crate::ebml::{read_vint_id, read_vint_size};
use crate::elements;
use crate::error::{MkvError, Result};
use tracing::debug;

/// An EBML element header located in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    /// The element ID, marker bit included.
    pub id: u64,
    /// Declared payload size.
    pub size: u64,
    /// Absolute offset of the first ID byte.
    pub offset: usize,
    /// Total header size (ID + size VINT) in bytes.
    pub header_size: usize,
}

impl ElementHeader {
    /// Absolute offset of the first payload byte.
    pub fn data_offset(&self) -> usize {
        self.offset + self.header_size
    }

    /// Absolute offset one past the declared payload.
    pub fn end(&self) -> Result<usize> {
        usize::try_from(self.size)
            .ok()
            .and_then(|size| self.data_offset().checked_add(size))
            .ok_or(MkvError::ElementOutOfBounds {
                id: self.id,
                end: u64::MAX,
                parent_end: u64::MAX,
            })
    }

    /// Get the total size of this element (header + content).
    pub fn total_size(&self) -> u64 {
        self.size.saturating_add(self.header_size as u64)
    }
}

/// Read the element header at the cursor.
///
/// On failure the cursor is left where it was.
pub fn next_element(cur: &mut ElementCursor<'_>) -> Result<ElementHeader> {
    let offset = cur.tell();
    let header = read_vint_id(cur).and_then(|(id_len, id)| {
        let (size_len, size) = read_vint_size(cur)?;
        Ok(ElementHeader {
            id,
            size,
            offset,
            header_size: id_len + size_len,
        })
    });

    if header.is_err() {
        // Only moves backwards, cannot fail.
        let _ = cur.seek(offset);
    }
    header
}

/// Compute a child's end, optionally enforcing that it lies inside its parent.
pub fn child_end(header: &ElementHeader, parent_end: usize, containment: bool) -> Result<usize> {
    let end = header.end().map_err(|_| MkvError::ElementOutOfBounds {
        id: header.id,
        end: u64::MAX,
        parent_end: parent_end as u64,
    })?;
    if containment && end > parent_end {
        return Err(MkvError::ElementOutOfBounds {
            id: header.id,
            end: end as u64,
            parent_end: parent_end as u64,
        });
    }
    Ok(end)
}

/// Visit every child of a master element whose payload ends at `end`.
///
/// `visit` receives the cursor, the child header and the child's end. The
/// cursor is moved to the child's end afterwards. The first error ends the
/// walk and is returned.
///
/// A child running past the end of the buffer is visited up to the buffer
/// end and ends the walk without an error, unless containment is on and the
/// parent itself ends inside the buffer.
pub fn for_each_child<'a, F>(
    cur: &mut ElementCursor<'a>,
    end: usize,
    containment: bool,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(&mut ElementCursor<'a>, &ElementHeader, usize) -> Result<()>,
{
    let buffer_end = cur.len();
    while cur.tell() < end {
        let child = next_element(cur)?;
        let declared_end = child.end().unwrap_or(usize::MAX);
        if declared_end > buffer_end && (!containment || end >= buffer_end) {
            debug!(
                id = child.id,
                element = elements::element_name(child.id),
                declared_end,
                buffer_end,
                "Element truncated by end of buffer"
            );
            visit(cur, &child, buffer_end)?;
            return cur.seek(buffer_end);
        }

        let child_end = child_end(&child, end, containment)?;
        visit(cur, &child, child_end)?;
        cur.seek(child_end)?;
    }
    Ok(())
}

/// Seek past an element's payload.
pub fn skip_element(cur: &mut ElementCursor<'_>, header: &ElementHeader) -> Result<()> {
    cur.seek(header.end()?)
}

/// Read an element's whole payload, which must lie inside the buffer.
pub fn read_payload<'a>(cur: &mut ElementCursor<'a>, header: &ElementHeader) -> Result<&'a [u8]> {
    cur.seek(header.data_offset())?;
    let size = usize::try_from(header.size).map_err(|_| MkvError::UnexpectedEof {
        offset: header.data_offset() as u64,
        needed: usize::MAX,
        available: cur.remaining(),
    })?;
    cur.read_exact(size)
}

/// Position the cursor on the payload of the first Segment element.
///
/// A leading non-Segment element (normally the EBML header) is skipped by
/// its declared size; after that the buffer is scanned element by element.
pub fn locate_segment(cur: &mut ElementCursor<'_>) -> Result<ElementHeader> {
    let first = next_element(cur)?;
    if first.id == elements::SEGMENT {
        return Ok(first);
    }

    debug!(
        id = first.id,
        element = elements::element_name(first.id),
        "Skipping leading element"
    );
    skip_element(cur, &first)?;

    while let Ok(header) = next_element(cur) {
        if header.id == elements::SEGMENT {
            return Ok(header);
        }
        if skip_element(cur, &header).is_err() {
            break;
        }
    }

    Err(MkvError::SegmentNotFound)
}
