//! Text utilities for identifiers and offsets.
//!
//! ## Coordinate Conventions
//!
//! - Byte offsets are **0-indexed**
//! - Rune offsets count Unicode scalar values; invalid UTF-8 sequences count
//!   one rune per byte, as a Go rune decoder would

/// Whether a Go identifier is exported (starts with an upper case letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Convert a byte offset into a rune offset.
///
/// Offsets past the end of `content` are clamped to its length.
pub fn byte_offset_to_rune_offset(content: &[u8], offset: usize) -> usize {
    let prefix = &content[..offset.min(content.len())];
    let mut runes = 0;
    for chunk in prefix.utf8_chunks() {
        runes += chunk.valid().chars().count() + chunk.invalid().len();
    }
    runes
}
