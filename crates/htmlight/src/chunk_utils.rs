//! Helpers for feeding a byte payload in pieces. Used by tests, benches and
//! the fuzz target to exercise the chunking behaviour of the tokenizers.

/// Split `payload` into approximately equal-sized chunks.
///
/// The tokenizers work on bytes, so chunks may cut through multi-byte UTF-8
/// sequences.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at positions derived from `splits`.
///
/// Each value in `splits` is reduced modulo the remaining length, so any
/// sequence of integers describes a valid partition. Whatever is left after
/// the last split becomes the final chunk.
#[must_use]
pub fn split_at_points<'a>(payload: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(splits.len() + 1);
    let mut rest = payload;
    for &split in splits {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(1 + split % rest.len());
        chunks.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
