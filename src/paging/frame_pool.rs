use crate::paging::translation_pipeline::PageNumber;

/// Use history value of a frame that was just allocated or referenced in the current epoch
pub const USE_HISTORY_RECENT: u8 = 0x80;

/// Metadata for one physical page frame (one row of the core map)
///
/// `use_history` is an 8-bit shift register used for pseudo-LRU replacement:
/// every reference sets the top bit and every decay shifts the whole register right,
/// so newer references sit in the higher bits and the frame with the lowest
/// value is the least recently used one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FramePoolEntry {
    occupied: bool,
    use_history: u8,
    owner: PageNumber,
}

impl FramePoolEntry {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    #[inline]
    pub fn use_history(&self) -> u8 {
        self.use_history
    }

    /// virtual page currently held by this frame
    #[inline]
    pub fn owner(&self) -> PageNumber {
        self.owner
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        !self.occupied
    }

    pub fn mark_used(&mut self) {
        self.use_history |= USE_HISTORY_RECENT;
    }

    pub fn decay(&mut self) {
        self.use_history >>= 1;
    }

    /// (re)assign the frame to `page`, as if it was freshly allocated
    pub fn update(&mut self, page: PageNumber) {
        self.occupied = true;
        self.use_history = USE_HISTORY_RECENT;
        self.owner = page;
    }
}
