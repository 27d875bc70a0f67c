//! A sliding gap buffer: one `Vec<u8>` holding already-decoded output ahead
//! of not-yet-consumed input, separated by a shrinking gap.
//!
//! This mirrors the `buffer_pointers` double-ended layout from the original
//! decoder (destination write cursor growing up, source read cursor growing
//! down into the same backing array) without raw pointer arithmetic: both
//! cursors are plain indices into one `Vec`, with the invariant
//! `dest_end <= src_begin`.

/// A single backing buffer split into a written prefix `[0, dest_end)` and an
/// unread suffix `[src_begin, len)`, with a gap `[dest_end, src_begin)` of
/// bytes that have already been consumed as source input and are free to be
/// overwritten or dropped.
#[derive(Debug, Default)]
pub struct SplitBuffer {
    data: Vec<u8>,
    dest_end: usize,
    src_begin: usize,
}

impl SplitBuffer {
    pub fn new() -> Self {
        SplitBuffer {
            data: Vec::new(),
            dest_end: 0,
            src_begin: 0,
        }
    }

    /// The decoded/written prefix, ready for the caller to drain.
    pub fn dest(&self) -> &[u8] {
        &self.data[..self.dest_end]
    }

    /// The not-yet-consumed source bytes.
    pub fn src(&self) -> &[u8] {
        &self.data[self.src_begin..]
    }

    /// Append more source bytes at the tail, for a caller feeding data in
    /// incrementally (e.g. off a `Read`).
    pub fn feed(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append `bytes` to the decoded/written prefix.
    pub fn push_dest(&mut self, bytes: &[u8]) {
        if self.dest_end == self.data.len() {
            self.data.extend_from_slice(bytes);
            self.dest_end += bytes.len();
            self.src_begin = self.dest_end;
            return;
        }
        self.data.splice(self.dest_end..self.dest_end, bytes.iter().copied());
        self.dest_end += bytes.len();
        self.src_begin += bytes.len();
    }

    /// Mark the first `n` bytes of `src()` as consumed, moving them past the
    /// gap. Panics if `n` exceeds the available source length.
    pub fn consume_src(&mut self, n: usize) {
        assert!(n <= self.src().len());
        self.src_begin += n;
    }

    /// Drop the fully-consumed gap and dest prefix, retaining only the
    /// remaining source bytes at the front of the backing `Vec`. Call this
    /// periodically on a long-running stream to bound memory use.
    pub fn compact(&mut self) {
        if self.src_begin == 0 {
            return;
        }
        self.data.drain(..self.src_begin);
        self.dest_end = 0;
        self.src_begin = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn src_len(&self) -> usize {
        self.data.len() - self.src_begin
    }
}
