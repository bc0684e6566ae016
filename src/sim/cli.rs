use clap::{Arg, ArgAction, Command, crate_version};
use std::ffi::OsString;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// narrate every access instead of only printing the final statistics
    pub verbose: bool,
}

pub fn command() -> Command {
    Command::new("paging-sim")
        .version(crate_version!())
        .about("Simulates TLB, page table and core map for a stream of virtual addresses read from stdin")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("print every access, fault and replacement"),
        )
}

/// any argument other than a single `-v` is rejected before the simulation starts
pub fn parse_args<I, T>(args: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(Options {
        verbose: matches.get_flag("verbose"),
    })
}
