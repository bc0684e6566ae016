use std::io::BufRead;

use crate::error::{Error, Result};
use crate::paging::translation_pipeline::VirtualAddress;

/// longest token that is still read as an address, anything longer asks for a snapshot
pub const MAX_ADDRESS_TOKEN_LEN: usize = 6;

/// One token of the access stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessToken {
    Address(VirtualAddress),
    /// print the statistics and all tables, without touching any state
    Snapshot,
}

impl AccessToken {
    /// hex digits are case insensitive and may carry a `0x` prefix, which counts towards the 6 characters
    pub fn parse(token: &str) -> Result<Self> {
        if token.len() > MAX_ADDRESS_TOKEN_LEN {
            return Ok(AccessToken::Snapshot);
        }
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::MalformedAddress(token.to_string()));
        }
        VirtualAddress::from_str_radix(digits, 16)
            .map(AccessToken::Address)
            .map_err(|_| Error::MalformedAddress(token.to_string()))
    }
}

/// Splits the input into whitespace separated tokens, line by line
pub fn read_tokens<R: BufRead>(reader: R) -> impl Iterator<Item = Result<String>> {
    reader.lines().flat_map(|line| -> Vec<Result<String>> {
        match line {
            Ok(line) => line
                .split_whitespace()
                .map(|token| Ok(token.to_string()))
                .collect(),
            Err(e) => vec![Err(e.into())],
        }
    })
}
