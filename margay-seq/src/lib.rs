//! Sequence alphabets and codon tables for the Margay alignment toolkit.
//!
//! - [`alphabet`] — nucleotide indexing and the IUPAC ambiguity alphabet the
//!   descendant side of an alignment is encoded against
//! - [`codon`] — codon indexing and the standard genetic code, used to
//!   classify substitutions as synonymous or nonsynonymous

pub mod alphabet;
pub mod codon;

pub use alphabet::{compatible_bases, nucleotide_index, symbol_index, NUM_SYMBOLS};
pub use codon::{amino_acid, codon_distance, codon_index, index_to_codon, is_synonymous};
