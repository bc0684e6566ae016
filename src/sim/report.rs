use json::{JsonValue, object};
use std::io::{self, Write};

use crate::paging::page_table::PAGE_TABLE_SIZE;
use crate::paging::translation_pipeline::{
    Snapshot, Statistics, TranslationEvent, TranslationOutcome,
};
use crate::sim::config::Config;

/// Receives everything the simulation driver has to tell, and decides how it is presented
pub trait Reporter {
    fn start(&mut self, config: &Config) -> io::Result<()>;

    fn access(&mut self, event: &TranslationEvent) -> io::Result<()>;

    /// the use histories of all frames were shifted
    fn decay(&mut self) -> io::Result<()>;

    /// explicit request from the access stream
    fn snapshot(&mut self, statistics: &Statistics, snapshot: &Snapshot<'_>) -> io::Result<()>;

    /// the access stream is exhausted
    fn finish(&mut self, statistics: &Statistics, snapshot: &Snapshot<'_>) -> io::Result<()>;
}

/// Plain text report, in verbose mode every access gets narrated
pub struct TextReporter<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_statistics(&mut self, statistics: &Statistics) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "statistics ")?;
        writeln!(self.out, "  access      = {}", statistics.accesses)?;
        writeln!(self.out, "  tlb misses  = {}", statistics.cache_misses)?;
        writeln!(self.out, "  page faults = {}", statistics.page_faults)
    }

    fn write_tables(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "tlb")?;
        for line in snapshot.cache {
            writeln!(
                self.out,
                "  valid = {}, vpn = 0x{:04x}, pfn = 0x{:02x}",
                line.is_valid() as u8,
                line.tag(),
                line.value()
            )?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "core map table")?;
        for (pfn, frame) in snapshot.frames.iter().enumerate() {
            writeln!(
                self.out,
                "  pfn = 0x{:02x}: valid = {}, use vector = 0x{:02x}, vpn = 0x{:04x}",
                pfn,
                frame.is_occupied() as u8,
                frame.use_history(),
                frame.owner()
            )?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "first ten entries of page table")?;
        for (vpn, entry) in snapshot.page_table.iter().enumerate() {
            writeln!(
                self.out,
                "  vpn = 0x{:04x}: presence = {}, pfn = 0x{:02x}",
                vpn,
                entry.is_present() as u8,
                entry.frame()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn start(&mut self, config: &Config) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(self.out)?;
        writeln!(self.out, "paging simulation")?;
        writeln!(
            self.out,
            "  {} virtual pages in the virtual address space",
            PAGE_TABLE_SIZE
        )?;
        writeln!(self.out, "  {} physical page frames", config.frames)?;
        writeln!(self.out, "  {} TLB entries", config.cache_entries)?;
        writeln!(
            self.out,
            "  use vectors in core map are shifted every {} accesses",
            config.decay_interval
        )?;
        writeln!(self.out)
    }

    fn access(&mut self, event: &TranslationEvent) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(self.out, "access {}:", event.access)?;
        writeln!(
            self.out,
            "  virtual address is              0x{:06x}",
            event.virtual_address
        )?;

        let physical = event.physical_address().unwrap_or_default();
        match event.outcome {
            TranslationOutcome::CacheHit { .. } => {
                writeln!(self.out, "  tlb hit, physical address is      0x{:04x}", physical)?;
                // no refill on a hit
                return Ok(());
            }
            TranslationOutcome::PageHit { .. } => {
                writeln!(self.out, "  tlb miss")?;
                writeln!(self.out, "  page hit, physical address is     0x{:04x}", physical)?;
            }
            TranslationOutcome::FrameAllocated { .. } => {
                writeln!(self.out, "  tlb miss")?;
                writeln!(self.out, "  page fault")?;
                writeln!(self.out, "  unused page frame allocated")?;
                writeln!(self.out, "  physical address is               0x{:04x}", physical)?;
            }
            TranslationOutcome::Replacement {
                frame,
                evicted_page,
            } => {
                writeln!(self.out, "  tlb miss")?;
                writeln!(self.out, "  page fault")?;
                writeln!(self.out, "  page replacement needed")?;
                writeln!(self.out, "  TLB invalidate of vpn 0x{:04x}", evicted_page)?;
                writeln!(self.out, "  replace frame {}", frame)?;
                writeln!(self.out, "  physical address is               0x{:04x}", physical)?;
            }
            TranslationOutcome::NoFrameAvailable => {
                writeln!(self.out, "  tlb miss")?;
                writeln!(self.out, "  page fault")?;
                writeln!(self.out, "  page replacement needed")?;
                writeln!(self.out, "  no page frame available")?;
            }
        }

        if let (Some(_), Some(frame)) = (event.cache_slot, event.outcome.frame()) {
            writeln!(
                self.out,
                "  tlb update of vpn 0x{:04x} with pfn 0x{:02x}",
                event.page, frame
            )?;
        }
        Ok(())
    }

    fn decay(&mut self) -> io::Result<()> {
        if self.verbose {
            writeln!(self.out, "shift use vectors")?;
        }
        Ok(())
    }

    fn snapshot(&mut self, statistics: &Statistics, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.write_statistics(statistics)?;
        self.write_tables(snapshot)
    }

    fn finish(&mut self, statistics: &Statistics, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.write_statistics(statistics)?;
        if self.verbose {
            self.write_tables(snapshot)?;
        }
        self.out.flush()
    }
}

pub fn statistics_json(statistics: &Statistics) -> JsonValue {
    object! {
        accesses: statistics.accesses,
        tlb_misses: statistics.cache_misses,
        page_faults: statistics.page_faults
    }
}

/// machine readable form of a snapshot, used for structured logs
pub fn snapshot_json(snapshot: &Snapshot<'_>) -> JsonValue {
    let tlb: Vec<JsonValue> = snapshot
        .cache
        .iter()
        .map(|line| {
            object! {
                valid: line.is_valid(),
                vpn: line.tag(),
                pfn: line.value()
            }
        })
        .collect();
    let core_map: Vec<JsonValue> = snapshot
        .frames
        .iter()
        .enumerate()
        .map(|(pfn, frame)| {
            object! {
                pfn: pfn,
                valid: frame.is_occupied(),
                use_vector: frame.use_history(),
                vpn: frame.owner()
            }
        })
        .collect();
    let page_table: Vec<JsonValue> = snapshot
        .page_table
        .iter()
        .enumerate()
        .map(|(vpn, entry)| {
            object! {
                vpn: vpn,
                presence: entry.is_present(),
                pfn: entry.frame()
            }
        })
        .collect();

    object! {
        tlb: tlb,
        core_map: core_map,
        page_table: page_table
    }
}
