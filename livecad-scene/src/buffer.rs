//! Attribute buffers with stable allocation identity

use bytemuck::Pod;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ALLOCATION: AtomicU64 = AtomicU64::new(1);

/// Identity of one buffer allocation.
///
/// An in-place overwrite keeps the id; a reallocation always produces a new
/// one. Ids are never handed out twice within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationId(u64);

impl AllocationId {
    fn fresh() -> Self {
        Self(NEXT_ALLOCATION.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Outcome of writing new contents into an attribute buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferWrite {
    /// Element count matched; storage was overwritten in place
    Reused,
    /// Element count differed; fresh storage was allocated
    Reallocated,
}

/// A typed vertex attribute or index buffer.
///
/// `item_size` is the number of scalars per element (3 for positions and
/// normals, 1 for indices). `version` increases on every write so that a
/// device-side mirror can tell which buffers need re-upload.
#[derive(Debug, Clone)]
pub struct AttributeBuffer<T: Pod> {
    data: Vec<T>,
    item_size: usize,
    allocation: AllocationId,
    version: u64,
    released: bool,
}

impl<T: Pod> AttributeBuffer<T> {
    /// Create a buffer owning a copy of `data`
    pub fn new(data: &[T], item_size: usize) -> Self {
        Self {
            data: data.to_vec(),
            item_size: item_size.max(1),
            allocation: AllocationId::fresh(),
            version: 0,
            released: false,
        }
    }

    /// Write new contents, reusing the allocation when the length matches
    pub fn write(&mut self, data: &[T]) -> BufferWrite {
        if !self.released && data.len() == self.data.len() {
            self.data.copy_from_slice(data);
            self.version += 1;
            BufferWrite::Reused
        } else {
            self.data = data.to_vec();
            self.allocation = AllocationId::fresh();
            self.version += 1;
            self.released = false;
            BufferWrite::Reallocated
        }
    }

    /// Free the storage; the buffer keeps its allocation id for bookkeeping
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.released = true;
    }

    /// Whether `release` has been called
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Number of scalars
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements (`len / item_size`)
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    /// Scalars per element
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Current allocation identity
    pub fn allocation(&self) -> AllocationId {
        self.allocation
    }

    /// Write counter
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Contents
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Contents as raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_length_write_reuses_allocation() {
        let mut buffer = AttributeBuffer::new(&[0.0f32; 9], 3);
        let allocation = buffer.allocation();
        let ptr = buffer.as_slice().as_ptr();

        assert_eq!(buffer.write(&[1.0f32; 9]), BufferWrite::Reused);
        assert_eq!(buffer.allocation(), allocation);
        assert_eq!(buffer.as_slice().as_ptr(), ptr);
        assert_eq!(buffer.version(), 1);
        assert_eq!(buffer.as_slice()[4], 1.0);
    }

    #[test]
    fn test_different_length_write_reallocates() {
        let mut buffer = AttributeBuffer::new(&[0u32; 3], 1);
        let allocation = buffer.allocation();

        assert_eq!(buffer.write(&[0, 1, 2, 2, 3, 0]), BufferWrite::Reallocated);
        assert_ne!(buffer.allocation(), allocation);
        assert_eq!(buffer.count(), 6);
    }

    #[test]
    fn test_release_frees_storage() {
        let mut buffer = AttributeBuffer::new(&[1.0f32; 6], 3);
        buffer.release();
        assert!(buffer.is_released());
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_bytes().len(), 0);
    }

    #[test]
    fn test_bytes_view() {
        let buffer = AttributeBuffer::new(&[1u32, 2, 3], 1);
        assert_eq!(buffer.as_bytes().len(), 12);
    }
}
