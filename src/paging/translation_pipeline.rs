use crate::paging::frame_pool::{FramePoolEntry, USE_HISTORY_RECENT};
use crate::paging::page_table::{PAGE_TABLE_SIZE, PageTableEntry};
use crate::paging::translation_cache::TranslationCacheEntry;

/// 24-bit virtual address: 16-bit page number followed by an 8-bit offset
pub type VirtualAddress = u32;
/// 16-bit physical address: 8-bit frame number followed by the untouched offset
pub type PhysicalAddress = u16;
pub type PageNumber = u16;
pub type FrameNumber = u8;

/// frame numbers are 8 bits wide, so the pool can never hold more than this
pub const MAX_FRAMES: usize = 1 << 8;

/// how many page table entries are part of a snapshot
pub const SNAPSHOT_PAGE_TABLE_ENTRIES: usize = 10;

/// mask applied to the use history of a frame on a page hit: if only the top bit survives,
/// the frame is re-initialized instead of just being marked as used
const PAGE_HIT_HISTORY_MASK: u8 = 0x8F;

#[inline]
pub fn physical_address(frame: FrameNumber, offset: u8) -> PhysicalAddress {
    ((frame as PhysicalAddress) << 8) | offset as PhysicalAddress
}

/// How a single access got resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// found in the translation cache
    CacheHit { frame: FrameNumber },
    /// cache miss, but the page was present in the page table
    PageHit { frame: FrameNumber },
    /// page fault served by a free frame
    FrameAllocated { frame: FrameNumber },
    /// page fault served by taking the frame away from `evicted_page`
    Replacement { frame: FrameNumber, evicted_page: PageNumber },
    /// page fault with an empty frame pool, nothing can be mapped
    NoFrameAvailable,
}

impl TranslationOutcome {
    pub fn frame(&self) -> Option<FrameNumber> {
        match *self {
            TranslationOutcome::CacheHit { frame }
            | TranslationOutcome::PageHit { frame }
            | TranslationOutcome::FrameAllocated { frame }
            | TranslationOutcome::Replacement { frame, .. } => Some(frame),
            TranslationOutcome::NoFrameAvailable => None,
        }
    }
}

/// Everything that happened during one call to `TranslationPipeline::translate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationEvent {
    /// 1-based ordinal of this access
    pub access: u64,
    pub virtual_address: VirtualAddress,
    pub page: PageNumber,
    pub offset: u8,
    pub outcome: TranslationOutcome,
    /// cache line that received the (page, frame) pair, if the cache was refilled
    pub cache_slot: Option<usize>,
}

impl TranslationEvent {
    pub fn physical_address(&self) -> Option<PhysicalAddress> {
        self.outcome
            .frame()
            .map(|frame| physical_address(frame, self.offset))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub accesses: u64,
    pub cache_misses: u64,
    pub page_faults: u64,
}

/// Read-only view over the tables of a pipeline, used for reporting
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub cache: &'a [TranslationCacheEntry],
    pub frames: &'a [FramePoolEntry],
    /// only the first `SNAPSHOT_PAGE_TABLE_ENTRIES` entries of the page table
    pub page_table: &'a [PageTableEntry],
}

/// Translates virtual addresses one at a time, the way an MMU with a software managed TLB would:
/// TLB lookup -> page table walk -> frame allocation or replacement -> TLB refill.
/// The three tables are owned here and are only mutated through `translate` and `decay_use_history`.
#[derive(Debug)]
pub struct TranslationPipeline {
    cache: Box<[TranslationCacheEntry]>,
    frames: Box<[FramePoolEntry]>,
    page_table: Box<[PageTableEntry]>,
    /// next cache line to be refilled (FIFO replacement)
    fifo: usize,
    statistics: Statistics,
}

impl TranslationPipeline {
    /// both capacities may be zero, which gives a cache that always misses
    /// and a pool that never has a frame to give
    pub fn new(frame_capacity: usize, cache_capacity: usize) -> Self {
        assert!(
            frame_capacity <= MAX_FRAMES,
            "frame numbers are 8 bits wide, cannot address {frame_capacity} frames"
        );
        Self {
            cache: vec![TranslationCacheEntry::default(); cache_capacity].into_boxed_slice(),
            frames: vec![FramePoolEntry::default(); frame_capacity].into_boxed_slice(),
            page_table: vec![PageTableEntry::default(); PAGE_TABLE_SIZE].into_boxed_slice(),
            fifo: 0,
            statistics: Statistics::default(),
        }
    }

    pub fn translate(&mut self, virtual_address: VirtualAddress) -> TranslationEvent {
        let page = ((virtual_address >> 8) & 0xFFFF) as PageNumber;
        let offset = (virtual_address & 0xFF) as u8;

        let (outcome, cache_slot) = match self.lookup_cache(page) {
            Some(frame) => {
                self.frames[frame as usize].mark_used();
                (TranslationOutcome::CacheHit { frame }, None)
            }
            None => {
                self.statistics.cache_misses += 1;
                self.walk_page_table(page)
            }
        };

        self.statistics.accesses += 1;
        tracing::trace!(
            access = self.statistics.accesses,
            page,
            ?outcome,
            "translated virtual address 0x{:06X}",
            virtual_address
        );

        TranslationEvent {
            access: self.statistics.accesses,
            virtual_address,
            page,
            offset,
            outcome,
            cache_slot,
        }
    }

    /// shift the use history of every frame one bit to the right
    pub fn decay_use_history(&mut self) {
        for frame in self.frames.iter_mut() {
            frame.decay();
        }
    }

    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.statistics
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            cache: &self.cache,
            frames: &self.frames,
            page_table: &self.page_table[..SNAPSHOT_PAGE_TABLE_ENTRIES],
        }
    }

    /// lines are scanned in index order, not in FIFO order
    fn lookup_cache(&self, page: PageNumber) -> Option<FrameNumber> {
        self.cache
            .iter()
            .find(|line| line.hit(page))
            .map(TranslationCacheEntry::value)
    }

    fn walk_page_table(&mut self, page: PageNumber) -> (TranslationOutcome, Option<usize>) {
        let entry = self.page_table[page as usize];
        if entry.hit() {
            let frame = entry.frame();
            let cache_slot = self.refill_cache(page, frame);
            let frame_entry = &mut self.frames[frame as usize];
            if frame_entry.use_history() & PAGE_HIT_HISTORY_MASK == USE_HISTORY_RECENT {
                frame_entry.update(page);
            } else {
                frame_entry.mark_used();
            }
            return (TranslationOutcome::PageHit { frame }, cache_slot);
        }

        self.statistics.page_faults += 1;
        let (index, evicted_page) = match self.frames.iter().position(FramePoolEntry::is_free) {
            Some(free) => (free, None),
            None => match self.select_victim() {
                Some(victim) => {
                    let evicted_page = self.frames[victim].owner();
                    self.page_table[evicted_page as usize].invalidate();
                    tracing::debug!(frame = victim, evicted_page, page, "replacing frame");
                    (victim, Some(evicted_page))
                }
                None => {
                    tracing::warn!(page, "page fault with an empty frame pool");
                    return (TranslationOutcome::NoFrameAvailable, None);
                }
            },
        };

        let frame = index as FrameNumber;
        self.frames[index].update(page);
        self.page_table[page as usize].update(frame);
        let cache_slot = self.refill_cache(page, frame);

        let outcome = match evicted_page {
            Some(evicted_page) => TranslationOutcome::Replacement {
                frame,
                evicted_page,
            },
            None => TranslationOutcome::FrameAllocated { frame },
        };
        (outcome, cache_slot)
    }

    /// pseudo-LRU victim: the frame with the lowest use history
    /// `min_by_key` keeps the first minimum, so ties go to the lowest frame number
    fn select_victim(&self) -> Option<usize> {
        self.frames
            .iter()
            .enumerate()
            .min_by_key(|(_, frame)| frame.use_history())
            .map(|(index, _)| index)
    }

    fn refill_cache(&mut self, page: PageNumber, frame: FrameNumber) -> Option<usize> {
        if self.cache.is_empty() {
            return None;
        }
        let slot = self.fifo;
        self.cache[slot].update(page, frame);
        self.fifo = (slot + 1) % self.cache.len();
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(page: PageNumber, offset: u8) -> VirtualAddress {
        ((page as VirtualAddress) << 8) | offset as VirtualAddress
    }

    fn present_pages(pipeline: &TranslationPipeline) -> usize {
        pipeline.page_table.iter().filter(|e| e.is_present()).count()
    }

    fn occupied_frames(pipeline: &TranslationPipeline) -> usize {
        pipeline.frames.iter().filter(|f| f.is_occupied()).count()
    }

    #[test]
    fn fills_free_frames_then_replaces_lowest_index_on_tie() {
        let mut pipeline = TranslationPipeline::new(2, 1);

        let first = pipeline.translate(0x000100);
        let second = pipeline.translate(0x000200);
        let third = pipeline.translate(0x000300);

        assert_eq!(first.outcome, TranslationOutcome::FrameAllocated { frame: 0 });
        assert_eq!(second.outcome, TranslationOutcome::FrameAllocated { frame: 1 });
        assert_eq!(
            third.outcome,
            TranslationOutcome::Replacement {
                frame: 0,
                evicted_page: 1
            }
        );
        assert!(!pipeline.page_table[1].is_present());
        assert_eq!(pipeline.page_table[3].frame(), 0);
        assert_eq!(
            pipeline.statistics(),
            Statistics {
                accesses: 3,
                cache_misses: 3,
                page_faults: 3
            }
        );
    }

    #[test]
    fn replacement_picks_strictly_lowest_history() {
        let mut pipeline = TranslationPipeline::new(3, 0);
        pipeline.translate(address(1, 0));
        pipeline.decay_use_history();
        pipeline.translate(address(2, 0));
        pipeline.decay_use_history();
        pipeline.translate(address(3, 0));
        // histories are now 0x20, 0x40, 0x80; reference page 1 again to lift frame 0
        let hit = pipeline.translate(address(1, 0));
        assert_eq!(hit.outcome, TranslationOutcome::PageHit { frame: 0 });

        let fault = pipeline.translate(address(4, 0));
        assert_eq!(
            fault.outcome,
            TranslationOutcome::Replacement {
                frame: 1,
                evicted_page: 2
            }
        );
    }

    #[test]
    fn repeated_address_hits_the_cache() {
        let mut pipeline = TranslationPipeline::new(4, 2);
        let first = pipeline.translate(0x00ABCD);
        let misses = pipeline.statistics().cache_misses;

        let second = pipeline.translate(0x00ABCD);
        assert_eq!(second.outcome, TranslationOutcome::CacheHit { frame: 0 });
        assert_eq!(second.physical_address(), first.physical_address());
        assert_eq!(second.physical_address(), Some(0x00CD));
        assert_eq!(second.cache_slot, None);
        assert_eq!(pipeline.statistics().cache_misses, misses);
        assert_eq!(pipeline.statistics().accesses, 2);
    }

    #[test]
    fn cache_hit_only_touches_the_use_history() {
        let mut pipeline = TranslationPipeline::new(2, 2);
        pipeline.translate(address(5, 1));
        pipeline.translate(address(6, 1));
        pipeline.decay_use_history();

        let cache = pipeline.cache.clone();
        let page_table = pipeline.page_table.clone();
        let mut frames = pipeline.frames.clone();
        let statistics = pipeline.statistics();

        let event = pipeline.translate(address(5, 0x42));
        assert_eq!(event.outcome, TranslationOutcome::CacheHit { frame: 0 });

        frames[0].mark_used();
        assert_eq!(pipeline.cache, cache);
        assert_eq!(pipeline.page_table, page_table);
        assert_eq!(pipeline.frames, frames);
        assert_eq!(pipeline.fifo, 0);
        assert_eq!(pipeline.statistics().cache_misses, statistics.cache_misses);
        assert_eq!(pipeline.statistics().page_faults, statistics.page_faults);
    }

    #[test]
    fn cache_refills_follow_fifo_order() {
        let mut pipeline = TranslationPipeline::new(8, 3);
        let pages = [1, 1, 2, 3, 1, 4, 2, 5];
        let slots: Vec<Option<usize>> = pages
            .iter()
            .map(|&page| pipeline.translate(address(page, 0)).cache_slot)
            .collect();

        // hits do not move the cursor, page 4 wraps around and overwrites page 1
        assert_eq!(
            slots,
            vec![Some(0), None, Some(1), Some(2), None, Some(0), None, Some(1)]
        );
        let tags: Vec<PageNumber> = pipeline.cache.iter().map(|line| line.tag()).collect();
        assert_eq!(tags, vec![4, 5, 3]);
    }

    #[test]
    fn page_hit_reinitializes_frame_touched_once() {
        let mut pipeline = TranslationPipeline::new(4, 1);
        pipeline.translate(address(1, 0));
        for _ in 0..3 {
            pipeline.decay_use_history();
        }
        // cache hit sets the top bit on top of 0x10
        pipeline.translate(address(1, 0));
        assert_eq!(pipeline.frames[0].use_history(), 0x90);

        // page 2 takes the single cache line, page 1 now goes through the page table
        pipeline.translate(address(2, 0));
        let event = pipeline.translate(address(1, 0));
        assert_eq!(event.outcome, TranslationOutcome::PageHit { frame: 0 });
        assert_eq!(pipeline.frames[0].use_history(), USE_HISTORY_RECENT);
    }

    #[test]
    fn page_hit_marks_frame_with_older_history() {
        let mut pipeline = TranslationPipeline::new(4, 1);
        pipeline.translate(address(1, 0));
        pipeline.translate(address(2, 0));
        pipeline.decay_use_history();
        pipeline.decay_use_history();

        let event = pipeline.translate(address(1, 0));
        assert_eq!(event.outcome, TranslationOutcome::PageHit { frame: 0 });
        assert_eq!(event.cache_slot, Some(0));
        assert_eq!(pipeline.frames[0].use_history(), 0xA0);
    }

    #[test]
    fn stale_cache_line_still_hits_after_eviction() {
        let mut pipeline = TranslationPipeline::new(1, 2);
        pipeline.translate(address(1, 0));
        let replacement = pipeline.translate(address(2, 0));
        assert_eq!(
            replacement.outcome,
            TranslationOutcome::Replacement {
                frame: 0,
                evicted_page: 1
            }
        );

        let stale = pipeline.translate(address(1, 7));
        assert_eq!(stale.outcome, TranslationOutcome::CacheHit { frame: 0 });
        assert!(!pipeline.page_table[1].is_present());
    }

    #[test]
    fn present_pages_match_occupied_frames() {
        let mut pipeline = TranslationPipeline::new(3, 2);
        let pages = [7, 8, 7, 9, 10, 11, 8, 7, 12, 12, 9, 1];
        for (i, &page) in pages.iter().enumerate() {
            pipeline.translate(address(page, i as u8));
            if i % 2 == 1 {
                pipeline.decay_use_history();
            }
            assert_eq!(present_pages(&pipeline), occupied_frames(&pipeline));
        }
        assert_eq!(occupied_frames(&pipeline), 3);
    }

    #[test]
    fn empty_tables_do_not_panic() {
        let mut pipeline = TranslationPipeline::new(0, 0);
        for _ in 0..2 {
            let event = pipeline.translate(address(3, 3));
            assert_eq!(event.outcome, TranslationOutcome::NoFrameAvailable);
            assert_eq!(event.physical_address(), None);
            assert_eq!(event.cache_slot, None);
        }
        pipeline.decay_use_history();
        assert_eq!(
            pipeline.statistics(),
            Statistics {
                accesses: 2,
                cache_misses: 2,
                page_faults: 2
            }
        );
        assert_eq!(present_pages(&pipeline), 0);
    }

    #[test]
    fn without_cache_every_access_walks_the_page_table() {
        let mut pipeline = TranslationPipeline::new(2, 0);
        let first = pipeline.translate(address(4, 0x10));
        let second = pipeline.translate(address(4, 0x20));
        assert_eq!(first.outcome, TranslationOutcome::FrameAllocated { frame: 0 });
        assert_eq!(second.outcome, TranslationOutcome::PageHit { frame: 0 });
        assert_eq!(second.physical_address(), Some(0x0020));
        assert_eq!(pipeline.statistics().cache_misses, 2);
        assert_eq!(pipeline.statistics().page_faults, 1);
    }

    #[test]
    fn physical_address_keeps_the_offset() {
        let mut pipeline = TranslationPipeline::new(4, 4);
        pipeline.translate(address(0x0100, 0));
        pipeline.translate(address(0x0200, 0));
        let event = pipeline.translate(0x0300FF);
        assert_eq!(event.page, 0x0300);
        assert_eq!(event.offset, 0xFF);
        assert_eq!(event.physical_address(), Some(0x02FF));
    }

    #[test]
    fn snapshot_exposes_first_ten_page_table_entries() {
        let mut pipeline = TranslationPipeline::new(2, 2);
        pipeline.translate(address(3, 0));
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.cache.len(), 2);
        assert_eq!(snapshot.frames.len(), 2);
        assert_eq!(snapshot.page_table.len(), SNAPSHOT_PAGE_TABLE_ENTRIES);
        assert!(snapshot.page_table[3].is_present());
    }
}
