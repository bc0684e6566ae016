use crate::error::Result;
use crate::paging::translation_pipeline::{Statistics, TranslationPipeline, VirtualAddress};
use crate::sim::config::Config;
use crate::sim::report::{Reporter, snapshot_json, statistics_json};
use crate::sim::trace::AccessToken;

/// Feeds the access stream through a `TranslationPipeline`, one token at a time,
/// shifting the use histories every `decay_interval` accesses
pub struct SimulationDriver<R: Reporter> {
    pipeline: TranslationPipeline,
    decay_interval: u64,
    reporter: R,
}

impl<R: Reporter> SimulationDriver<R> {
    pub fn new(config: &Config, reporter: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: TranslationPipeline::new(config.frames, config.cache_entries),
            decay_interval: config.decay_interval,
            reporter,
        })
    }

    /// parse and process a single token of the access stream
    pub fn feed(&mut self, token: &str) -> Result<()> {
        match AccessToken::parse(token)? {
            AccessToken::Address(virtual_address) => self.access(virtual_address),
            AccessToken::Snapshot => self.snapshot(),
        }
    }

    fn access(&mut self, virtual_address: VirtualAddress) -> Result<()> {
        let event = self.pipeline.translate(virtual_address);
        self.reporter.access(&event)?;

        // the counter already includes this access
        if event.access % self.decay_interval == 0 {
            self.pipeline.decay_use_history();
            tracing::trace!(access = event.access, "shifted use vectors");
            self.reporter.decay()?;
        }
        Ok(())
    }

    fn snapshot(&mut self) -> Result<()> {
        let statistics = self.pipeline.statistics();
        let snapshot = self.pipeline.snapshot();
        tracing::debug!(
            statistics = %statistics_json(&statistics),
            tables = %snapshot_json(&snapshot),
            "snapshot requested"
        );
        self.reporter.snapshot(&statistics, &snapshot)?;
        Ok(())
    }

    /// run the whole stream and report the final statistics
    /// the first malformed token aborts the run, nothing gets reported for it
    pub fn run<I>(&mut self, config: &Config, tokens: I) -> Result<Statistics>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        tracing::info!(
            frames = config.frames,
            tlb_entries = config.cache_entries,
            decay_interval = config.decay_interval,
            "starting paging simulation"
        );
        self.reporter.start(config)?;

        for token in tokens {
            self.feed(&token?)?;
        }

        let statistics = self.pipeline.statistics();
        self.reporter.finish(&statistics, &self.pipeline.snapshot())?;
        tracing::info!(
            accesses = statistics.accesses,
            tlb_misses = statistics.cache_misses,
            page_faults = statistics.page_faults,
            "paging simulation finished"
        );
        Ok(statistics)
    }
}
