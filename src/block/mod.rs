//! Whole-line block storage
//!
//! Buffer text lives in an ordered list of byte blocks. A block never
//! splits a line: every block except possibly the last ends with a
//! newline, so any line is a contiguous slice of exactly one block.
//! Exactly one empty block exists iff the buffer is empty; zero-sized
//! blocks are otherwise forbidden.
//!
//! [`BlockIter`] is the byte cursor over a [`BlockList`]. It is a
//! plain value; copying it is the way positions are saved.

pub mod iter;

pub use self::iter::BlockIter;

/// Blocks grown past this by local edits are split on line
/// boundaries, and neighbours are only merged while the result stays
/// under it.
pub const BLOCK_EDIT_MAX: usize = 8 * 1024;

/// Target block size when loading a file.
pub const BLOCK_LOAD_MAX: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Block {
    pub data: Vec<u8>,
    /// Newline count inside `data`.
    pub nl: usize,
}

impl Block {
    fn new(data: Vec<u8>) -> Self {
        let nl = count_nl(&data);
        Block { data, nl }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

fn count_nl(data: &[u8]) -> usize {
    data.iter().filter(|&&b| b == b'\n').count()
}

/// The ordered block list owned by a buffer.
#[derive(Debug, Clone)]
pub struct BlockList {
    blocks: Vec<Block>,
}

impl BlockList {
    pub fn new() -> Self {
        BlockList {
            blocks: vec![Block::new(Vec::new())],
        }
    }

    /// Build a list from raw bytes, splitting into whole-line blocks
    /// of roughly [`BLOCK_LOAD_MAX`] bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        if data.is_empty() {
            return BlockList::new();
        }
        BlockList {
            blocks: chunk_lines(data, BLOCK_LOAD_MAX),
        }
    }

    pub fn nr_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, idx: usize) -> &Block {
        &self.blocks[idx]
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.size()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].size() == 0
    }

    /// Total newline count.
    pub fn nl_count(&self) -> usize {
        self.blocks.iter().map(|b| b.nl).sum()
    }

    /// Number of lines, counting a final unterminated line.
    pub fn line_count(&self) -> usize {
        let nl = self.nl_count();
        let last = self.blocks.last().expect("at least one block");
        if last.data.last().map_or(true, |&b| b != b'\n') {
            nl + 1
        } else {
            nl
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for b in &self.blocks {
            out.extend_from_slice(&b.data);
        }
        out
    }

    /// Insert `ins` at the iterator position. Returns the number of
    /// newlines inserted.
    pub fn insert(&mut self, iter: BlockIter, ins: &[u8]) -> usize {
        if ins.is_empty() {
            return 0;
        }
        let (blk, offset) = self.locate(iter);
        let mut region = std::mem::take(&mut self.blocks[blk].data);
        region.splice(offset..offset, ins.iter().copied());
        self.replace_blocks(blk..blk + 1, region);
        count_nl(ins)
    }

    /// Delete `del` bytes starting at the iterator position,
    /// returning them. Returns the removed bytes.
    pub fn delete(&mut self, iter: BlockIter, del: usize) -> Vec<u8> {
        if del == 0 {
            return Vec::new();
        }
        let (first, offset) = self.locate(iter);

        // Collect the affected block range
        let mut last = first;
        let mut avail = self.blocks[first].size() - offset;
        while avail < del {
            last += 1;
            avail += self.blocks[last].size();
        }

        let mut region: Vec<u8> = Vec::new();
        for b in &self.blocks[first..=last] {
            region.extend_from_slice(&b.data);
        }
        let deleted: Vec<u8> = region.drain(offset..offset + del).collect();
        self.replace_blocks(first..last + 1, region);
        deleted
    }

    /// The 0-based line number containing absolute byte `offset`.
    pub fn line_at_offset(&self, mut offset: usize) -> usize {
        let mut line = 0;
        for b in &self.blocks {
            if offset <= b.size() {
                return line + b.data[..offset].iter().filter(|&&c| c == b'\n').count();
            }
            line += b.nl;
            offset -= b.size();
        }
        line
    }

    /// Copy `len` bytes starting at the iterator position, crossing
    /// block boundaries as needed.
    pub fn get_bytes(&self, iter: BlockIter, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        let (mut blk, mut offset) = self.locate(iter);
        while out.len() < len {
            let data = &self.blocks[blk].data;
            let take = (len - out.len()).min(data.len() - offset);
            out.extend_from_slice(&data[offset..offset + take]);
            if out.len() < len {
                blk += 1;
                offset = 0;
            } else {
                break;
            }
        }
        out
    }

    /// Resolve an iterator that may sit at the very end of a block to
    /// concrete (block, offset) coordinates inside this list.
    fn locate(&self, iter: BlockIter) -> (usize, usize) {
        let mut blk = iter.blk;
        let mut offset = iter.offset;
        if offset == self.blocks[blk].size() && blk + 1 < self.blocks.len() {
            blk += 1;
            offset = 0;
        }
        (blk, offset)
    }

    /// Replace the block range with `bytes` re-chunked into
    /// whole-line blocks, then merge undersized neighbours.
    fn replace_blocks(&mut self, range: std::ops::Range<usize>, bytes: Vec<u8>) {
        let start = range.start;
        let replacement = if bytes.is_empty() {
            Vec::new()
        } else {
            chunk_lines(&bytes, BLOCK_EDIT_MAX)
        };
        self.blocks.splice(range, replacement);

        if self.blocks.is_empty() {
            self.blocks.push(Block::new(Vec::new()));
            return;
        }

        // Merge with the preceding and following block while the
        // result stays under the cap, keeping blocks whole-line.
        self.try_merge(start);
        if start > 0 {
            self.try_merge(start - 1);
        }
    }

    fn try_merge(&mut self, idx: usize) {
        while idx + 1 < self.blocks.len()
            && self.blocks[idx].size() + self.blocks[idx + 1].size() <= BLOCK_EDIT_MAX
        {
            let next = self.blocks.remove(idx + 1);
            let cur = &mut self.blocks[idx];
            cur.data.extend_from_slice(&next.data);
            cur.nl += next.nl;
        }
    }
}

impl Default for BlockList {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `data` into whole-line blocks of at most `max` bytes. A
/// single line longer than `max` becomes one oversized block.
fn chunk_lines(data: &[u8], max: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < data.len() {
        let remaining = &data[start..];
        let take = if remaining.len() <= max {
            remaining.len()
        } else {
            match remaining[..max].iter().rposition(|&b| b == b'\n') {
                Some(nl) => nl + 1,
                // Line longer than the cap: extend to its newline
                None => match remaining.iter().position(|&b| b == b'\n') {
                    Some(nl) => nl + 1,
                    None => remaining.len(),
                },
            }
        };
        blocks.push(Block::new(remaining[..take].to_vec()));
        start += take;
    }
    blocks
}
