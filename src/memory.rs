use crate::error::{HarnessError, Result};

/// Size of one page of [`GrowableMemory`].
pub const PAGE_SIZE: usize = 64 * 1024;

/// The linear memory of a backend instance.
///
/// Both the location and the size of the bytes returned by [`LinearMemory::bytes`]
/// may change on *any* call into the backend (stepping, loading a program, even a key
/// event may allocate). Never keep an offset-derived slice around across such a call:
/// get a new [`FrameView`] through [`acquire_view`] instead.
pub trait LinearMemory {
    /// The region as it is right now.
    fn bytes(&self) -> &[u8];
}

impl LinearMemory for [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl LinearMemory for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

/// A linear memory that grows in pages of [`PAGE_SIZE`] bytes. Growing moves the
/// contents to a new allocation, just like the memory of a portable executable module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowableMemory {
    data: Vec<u8>,
}

impl GrowableMemory {
    pub fn new(pages: usize) -> Self {
        Self {
            data: vec![0; pages * PAGE_SIZE],
        }
    }

    pub fn pages(&self) -> usize {
        self.data.len() / PAGE_SIZE
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grows the memory by `pages` pages and returns the previous page count.
    /// Existing contents are kept, but they will live at a new address.
    pub fn grow(&mut self, pages: usize) -> usize {
        let previous = self.pages();
        let mut data = vec![0; self.data.len() + pages * PAGE_SIZE];
        data[..self.data.len()].copy_from_slice(&self.data);
        self.data = data;
        previous
    }

    /// Copies `bytes` into memory starting at `offset`.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let size = self.data.len();
        let end = checked_end(offset, bytes.len(), size)?;
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl LinearMemory for GrowableMemory {
    fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A bounded, read-only window on a backend's frame buffer.
///
/// The view borrows the memory it was taken from, so it can't outlive the next mutable
/// call into the backend. The run loop takes a fresh one for every frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'mem> {
    offset: usize,
    samples: &'mem [u8],
}

impl<'mem> FrameView<'mem> {
    /// Offset of the first sample in the linear memory at the time the view was taken.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &'mem [u8] {
        self.samples
    }
}

fn checked_end(offset: usize, length: usize, size: usize) -> Result<usize> {
    offset
        .checked_add(length)
        .filter(|&end| end <= size)
        .ok_or(HarnessError::OutOfBounds {
            offset,
            length,
            size,
        })
}

/// Looks up the current extent of `region` and returns a view of `length` bytes
/// starting at `offset`.
pub fn acquire_view<M>(region: &M, offset: usize, length: usize) -> Result<FrameView<'_>>
where
    M: LinearMemory + ?Sized,
{
    let bytes = region.bytes();
    let end = checked_end(offset, length, bytes.len())?;

    Ok(FrameView {
        offset,
        samples: &bytes[offset..end],
    })
}
