//! Cell memory: exclusively owned or shared between exactly two cells.
//!
//! A cell normally owns its memory outright. In the arena two cells are
//! constructed over one [`SharedMemory`] handle and alternate single steps on
//! a single thread, so `Rc<RefCell<..>>` reproduces the aliased-buffer
//! semantics of the original design without unsynchronized aliasing.

use std::cell::RefCell;
use std::rc::Rc;

/// Handle to a memory buffer shared by co-resident cells.
pub type SharedMemory = Rc<RefCell<Vec<u8>>>;

/// Creates a zeroed shared buffer of the given capacity.
pub fn shared_buffer(capacity: usize) -> SharedMemory {
    Rc::new(RefCell::new(vec![0; capacity]))
}

/// Backing storage for one cell.
pub enum CellMemory {
    /// Buffer owned exclusively by one cell; zeroed on construction and reset.
    Owned(Vec<u8>),
    /// View into a buffer shared with exactly one other cell; never zeroed by
    /// reset so co-resident cells do not erase each other's loaded program.
    Shared(SharedMemory),
}

impl CellMemory {
    /// Fresh zeroed memory owned by the cell.
    pub fn owned(capacity: usize) -> Self {
        CellMemory::Owned(vec![0; capacity])
    }

    /// Memory shared with another cell. The buffer contents are left as-is.
    pub fn shared(handle: SharedMemory) -> Self {
        CellMemory::Shared(handle)
    }

    /// Fixed capacity of the backing buffer.
    pub fn capacity(&self) -> usize {
        match self {
            CellMemory::Owned(buf) => buf.len(),
            CellMemory::Shared(handle) => handle.borrow().len(),
        }
    }

    /// Whether this cell owns its buffer exclusively.
    pub fn is_owned(&self) -> bool {
        matches!(self, CellMemory::Owned(_))
    }

    /// Reads the byte at `addr` modulo capacity.
    pub fn read(&self, addr: usize) -> u8 {
        match self {
            CellMemory::Owned(buf) => buf[addr % buf.len()],
            CellMemory::Shared(handle) => {
                let buf = handle.borrow();
                buf[addr % buf.len()]
            }
        }
    }

    /// Writes the byte at `addr` modulo capacity.
    pub fn write(&mut self, addr: usize, value: u8) {
        match self {
            CellMemory::Owned(buf) => {
                let len = buf.len();
                buf[addr % len] = value;
            }
            CellMemory::Shared(handle) => {
                let mut buf = handle.borrow_mut();
                let len = buf.len();
                buf[addr % len] = value;
            }
        }
    }

    /// Copies `bytes` into the start of the buffer. The caller has already
    /// checked that `bytes` fits.
    pub fn load(&mut self, bytes: &[u8]) {
        match self {
            CellMemory::Owned(buf) => buf[..bytes.len()].copy_from_slice(bytes),
            CellMemory::Shared(handle) => {
                handle.borrow_mut()[..bytes.len()].copy_from_slice(bytes)
            }
        }
    }

    /// Zeroes the buffer. Only meaningful for owned memory; shared buffers
    /// are cleared by their owner (the arena), not by individual cells.
    pub fn zero(&mut self) {
        if let CellMemory::Owned(buf) = self {
            buf.fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_memory_starts_zeroed() {
        let mem = CellMemory::owned(64);
        assert_eq!(mem.capacity(), 64);
        assert!(mem.is_owned());
        for addr in 0..64 {
            assert_eq!(mem.read(addr), 0);
        }
    }

    #[test]
    fn read_write_wrap_modulo_capacity() {
        let mut mem = CellMemory::owned(16);
        mem.write(17, 0xAB);
        assert_eq!(mem.read(1), 0xAB);
        assert_eq!(mem.read(33), 0xAB);
    }

    #[test]
    fn shared_memory_is_visible_through_both_views() {
        let handle = shared_buffer(32);
        let mut a = CellMemory::shared(handle.clone());
        let b = CellMemory::shared(handle);
        a.write(5, 42);
        assert_eq!(b.read(5), 42);
        assert!(!a.is_owned());
    }

    #[test]
    fn zero_leaves_shared_memory_untouched() {
        let handle = shared_buffer(8);
        handle.borrow_mut()[3] = 9;
        let mut mem = CellMemory::shared(handle.clone());
        mem.zero();
        assert_eq!(handle.borrow()[3], 9);
    }
}
