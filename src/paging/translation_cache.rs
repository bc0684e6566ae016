use crate::paging::translation_pipeline::{FrameNumber, PageNumber};

/// One line of the fully associative translation cache (TLB)
/// Maps a virtual page number (tag) to the frame number (value) it was last seen in
/// There is no invalidation of a single line: lines only ever get overwritten by a refill,
/// so a line can keep pointing to a frame whose page was evicted in the meantime
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslationCacheEntry {
    valid: bool,
    tag: PageNumber,
    value: FrameNumber,
}

impl TranslationCacheEntry {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn tag(&self) -> PageNumber {
        self.tag
    }

    #[inline]
    pub fn value(&self) -> FrameNumber {
        self.value
    }

    /// invalid lines never match, whatever tag they still hold
    #[inline]
    pub fn hit(&self, page: PageNumber) -> bool {
        self.valid && self.tag == page
    }

    pub fn update(&mut self, page: PageNumber, frame: FrameNumber) {
        self.valid = true;
        self.tag = page;
        self.value = frame;
    }
}
