use crate::paging::translation_pipeline::FrameNumber;

/// Number of virtual pages in the simulated address space (16-bit page numbers)
pub const PAGE_TABLE_SIZE: usize = 1 << 16;

/// Direct mapped page table entry, indexed by the virtual page number
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    present: bool,
    frame: FrameNumber,
}

impl PageTableEntry {
    #[inline]
    pub fn is_present(&self) -> bool {
        self.present
    }

    #[inline]
    pub fn frame(&self) -> FrameNumber {
        self.frame
    }

    #[inline]
    pub fn hit(&self) -> bool {
        self.present
    }

    pub fn update(&mut self, frame: FrameNumber) {
        self.present = true;
        self.frame = frame;
    }

    /// must be called on the old owner before its frame is handed to another page
    pub fn invalidate(&mut self) {
        self.present = false;
        self.frame = 0;
    }
}
