//! Bounded FIFO byte buffer for one bridge direction.
//!
//! Allocated once per interface and never resized. Strictly FIFO: consumed
//! bytes are removed from the front and the remainder shifted down, so the
//! occupied region always starts at index zero.

use crate::config::bridge::BUFFER_CAPACITY;
use heapless::Vec;

pub struct DirectionalBuffer {
    data: Vec<u8, BUFFER_CAPACITY>,
}

impl DirectionalBuffer {
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn free_space(&self) -> usize {
        BUFFER_CAPACITY - self.data.len()
    }

    /// Occupied bytes, oldest first
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append one byte. Returns false (and leaves the buffer unchanged) when
    /// full — drop-newest policy.
    pub fn push(&mut self, byte: u8) -> bool {
        self.data.push(byte).is_ok()
    }

    /// Fill the unoccupied tail through `read`, which receives a slice of at
    /// most `max` bytes and returns how many it produced.
    ///
    /// Returns the number of bytes committed. With `max == 0` or a full
    /// buffer, `read` is not invoked.
    pub fn fill_from(&mut self, max: usize, read: impl FnOnce(&mut [u8]) -> usize) -> usize {
        let want = max.min(self.free_space());
        if want == 0 {
            return 0;
        }

        let old_len = self.data.len();
        // Grow to expose the writable tail; trimmed back to what was
        // actually produced below.
        if self.data.resize_default(old_len + want).is_err() {
            return 0;
        }
        let produced = read(&mut self.data[old_len..old_len + want]);
        let produced = produced.min(want);
        self.data.truncate(old_len + produced);
        produced
    }

    /// Remove the oldest `count` bytes, shifting the remainder to the front
    pub fn consume(&mut self, count: usize) {
        let count = count.min(self.data.len());
        if count == 0 {
            return;
        }
        let remaining = self.data.len() - count;
        self.data.copy_within(count.., 0);
        self.data.truncate(remaining);
    }

    /// Remove and return the oldest byte
    pub fn pop_front(&mut self) -> Option<u8> {
        let byte = *self.data.first()?;
        self.consume(1);
        Some(byte)
    }
}

impl Default for DirectionalBuffer {
    fn default() -> Self {
        Self::new()
    }
}
