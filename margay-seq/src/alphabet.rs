//! Nucleotide and IUPAC ambiguity alphabets.
//!
//! Margay encodes descendant sequences against a 15-symbol alphabet: the
//! four standard bases followed by the eleven IUPAC ambiguity codes. The
//! symbol index doubles as the column index of the marginal emission table,
//! so the ordering here is load-bearing.

/// Number of encoded symbols: A, C, G, T plus the 11 IUPAC ambiguity codes.
pub const NUM_SYMBOLS: usize = 15;

/// Symbol characters in encoding order.
const SYMBOLS: [u8; NUM_SYMBOLS] = [
    b'A', b'C', b'G', b'T', b'R', b'Y', b'S', b'W', b'K', b'M', b'B', b'D', b'H', b'V', b'N',
];

/// Compatible concrete bases (as indices 0..4) for each symbol, in
/// encoding order.
const COMPATIBLE: [&[usize]; NUM_SYMBOLS] = [
    &[0],
    &[1],
    &[2],
    &[3],
    &[0, 2],       // R: puRine
    &[1, 3],       // Y: pYrimidine
    &[1, 2],       // S: strong
    &[0, 3],       // W: weak
    &[2, 3],       // K: keto
    &[0, 1],       // M: amino
    &[1, 2, 3],    // B: not A
    &[0, 2, 3],    // D: not C
    &[0, 1, 3],    // H: not G
    &[0, 1, 2],    // V: not T
    &[0, 1, 2, 3], // N: any
];

/// Map a nucleotide byte to an index (A=0, C=1, G=2, T=3).
///
/// Accepts both upper and lower case; `U` is treated as `T`. Returns `None`
/// for ambiguity codes and non-nucleotide bytes.
pub fn nucleotide_index(b: u8) -> Option<usize> {
    match b.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' | b'U' => Some(3),
        _ => None,
    }
}

/// Map a nucleotide or IUPAC ambiguity byte to its symbol index in
/// `[0, NUM_SYMBOLS)`.
///
/// Accepts both cases and `U` for `T`. Returns `None` for bytes outside the
/// IUPAC alphabet (including gap characters).
pub fn symbol_index(b: u8) -> Option<u8> {
    let b = match b.to_ascii_uppercase() {
        b'U' => b'T',
        other => other,
    };
    SYMBOLS.iter().position(|&s| s == b).map(|i| i as u8)
}

/// The symbol character for an encoded index.
///
/// # Panics
///
/// Panics if `index >= NUM_SYMBOLS`.
pub fn index_to_symbol(index: u8) -> u8 {
    SYMBOLS[index as usize]
}

/// Concrete bases (indices 0..4) an encoded symbol can resolve to.
///
/// Standard bases resolve to themselves; ambiguity codes to their IUPAC
/// sets.
///
/// # Panics
///
/// Panics if `index >= NUM_SYMBOLS`.
pub fn compatible_bases(index: u8) -> &'static [usize] {
    COMPATIBLE[index as usize]
}
