//! Codon substitution models for the Margay alignment toolkit.
//!
//! Builds the Muse & Gaut (1994) 64×64 codon substitution process — either
//! over an empirical nucleotide rate table or a GTR construction — and
//! marginalizes the resulting transition probability matrix into the
//! per-nucleotide emission table the alignment engine scores against.
//!
//! - [`rates`] — injectable 4×4 nucleotide rate defaults (Yang 1994, GTR)
//! - [`mg94`] — MG94 generator construction and matrix exponentiation
//! - [`marginal`] — the 192-row marginal emission table and ambiguity policies

pub mod marginal;
pub mod mg94;
pub mod rates;

pub use marginal::{AmbiguityPolicy, MarginalTable};
pub use mg94::{mg94_generator, mg94_probability, transition_probability, NUM_CODONS};
pub use rates::{gtr_rates, yang94_rates, NucRates};
