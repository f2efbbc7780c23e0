//! DIMACS-style literals and their index encodings.
//!
//! A literal is a nonzero signed integer; the sign encodes polarity and the
//! magnitude is a variable index in `[1, max_var]`. Zero and `i32::MIN` are
//! invalid.

/// A propositional literal in DIMACS encoding.
pub type Lit = i32;

/// Returns the variable index of a literal.
#[inline]
#[must_use]
pub fn vidx(lit: Lit) -> usize {
    debug_assert!(lit != 0 && lit != i32::MIN);
    lit.unsigned_abs() as usize
}

/// Maps a literal to an unsigned index with the LSB denoting the sign.
///
/// Both polarities of a variable land in neighboring slots, which keeps
/// literal-indexed tables (watch lists in particular) cache friendly.
#[inline]
#[must_use]
pub fn vlit(lit: Lit) -> usize {
    2 * vidx(lit) + usize::from(lit < 0)
}

/// Returns `+1` for a positive and `-1` for a negative literal.
#[inline]
#[must_use]
pub fn polarity(lit: Lit) -> i8 {
    if lit < 0 {
        -1
    } else {
        1
    }
}

/// Checks that a literal is well formed and within the variable range.
#[inline]
#[must_use]
pub fn valid(lit: Lit, max_var: usize) -> bool {
    lit != 0 && lit != i32::MIN && vidx(lit) <= max_var
}
