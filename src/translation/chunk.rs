//! Byte-bounded message splitting.
//!
//! The translation API rejects very large `contents` entries, so long Slack
//! messages are split into chunks before translation. Cuts prefer a newline
//! inside the `(min, max]` window and always land on a UTF-8 character
//! boundary, so Hangul and kana are never split in half.

/// Byte window used when looking for a cut point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    /// Lower bound of the newline search window (exclusive)
    pub min: usize,
    /// Hard upper bound for a chunk in bytes
    pub max: usize,
}

impl ChunkLimits {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self::new(1600, 1800)
    }
}

/// Split `text` into chunks of at most `limits.max` bytes.
///
/// The newline a cut lands on is kept at the start of the following chunk,
/// so concatenating the chunks reproduces `text` exactly.
pub fn split_by_newline(text: &str, limits: ChunkLimits) -> Vec<&str> {
    debug_assert!(limits.min < limits.max, "min must be below max");

    if text.len() <= limits.max {
        return vec![text];
    }

    let mut parts = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        if rest.len() <= limits.max {
            parts.push(rest);
            break;
        }

        let cut = find_cut(rest, limits);
        let (head, tail) = rest.split_at(cut);
        parts.push(head);
        rest = tail;
    }

    parts
}

/// Pick the cut offset for a remainder longer than `limits.max`.
fn find_cut(rest: &str, limits: ChunkLimits) -> usize {
    let bytes = rest.as_bytes();

    let mut cut = limits.max;
    while cut > limits.min && bytes[cut] != b'\n' {
        cut -= 1;
    }
    if cut <= limits.min {
        cut = limits.max;
    }

    // Back off to the start of the character containing `cut`
    while cut > 0 && !rest.is_char_boundary(cut) {
        cut -= 1;
    }

    // A window smaller than one character would stall; take the whole char
    if cut == 0 {
        cut = rest
            .char_indices()
            .nth(1)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
    }

    cut
}
