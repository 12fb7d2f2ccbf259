//! Benchmark workloads for the dynarr container.
//!
//! - [`insertion_positions`]: deterministic insert positions via seed
//! - [`filled`]: an array of `0..len` with the default growth history

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dynarr_array::{ArrayError, DynamicArray};

/// Generate `n` deterministic insert positions for an array that starts at
/// length `start_len` and grows by one per insert.
///
/// Position `i` is in `0..=start_len + i`, so replaying the positions in
/// order is always valid.
pub fn insertion_positions(start_len: usize, n: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % (start_len + i + 1)
        })
        .collect()
}

/// An array holding `0..len`, built by repeated pushes.
pub fn filled(len: usize) -> Result<DynamicArray<u64>, ArrayError> {
    let mut arr = DynamicArray::new();
    for v in 0..len as u64 {
        arr.push(v)?;
    }
    Ok(arr)
}
