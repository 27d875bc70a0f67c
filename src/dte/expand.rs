//! Recursive digram expansion: turn substitution bytes back into the byte
//! pairs they stand for, depth-first, using an explicit stack rather than
//! recursion so a malformed (cyclic) table fails cleanly instead of
//! overflowing the real call stack.

use super::table::DigramTable;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// The digram table contains a cycle (or a chain deeper than 256
    /// deferred right-halves), so expansion can never terminate.
    #[error("digram table is cyclic or too deep to expand (stack exceeded 256 entries)")]
    CyclicTable,
}

const MAX_STACK: usize = 256;

/// Pre-size an output buffer using the same Fibonacci-growth schedule as
/// the original tool's allocator, targeting roughly double the input size
/// (the typical compression ratio of English-ish text under DTE).
pub fn grow_capacity(input_len: usize) -> usize {
    let mut capacity = 0usize;
    let mut prev = 64usize;
    while capacity < input_len.saturating_mul(2) {
        let n = capacity;
        capacity += prev;
        prev = n;
    }
    capacity
}

/// Expand `input` through `table`, recursively substituting every
/// non-literal byte with its (left, right) pair until only literal bytes
/// remain.
///
/// Inputs shorter than 2 bytes expand to nothing, matching the original
/// tool's guard against operating on a table-less or empty stream.
pub fn expand(input: &[u8], table: &DigramTable) -> Result<Vec<u8>, ExpandError> {
    if input.len() < 2 {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(grow_capacity(input.len()));
    let mut stack: Vec<u8> = Vec::with_capacity(MAX_STACK);
    let mut idx = 1;
    let mut c = input[0];

    loop {
        if table.is_literal(c) {
            out.push(c);
            if let Some(next) = stack.pop() {
                c = next;
            } else if idx < input.len() {
                c = input[idx];
                idx += 1;
            } else {
                break;
            }
        } else {
            if stack.len() >= MAX_STACK {
                return Err(ExpandError::CyclicTable);
            }
            let (l, r) = table.get(c);
            stack.push(r);
            c = l;
        }
    }

    debug!("expanded {} input bytes into {} output bytes", input.len(), out.len());
    Ok(out)
}
