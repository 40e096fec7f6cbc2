//! File format parsing and writing for the Margay alignment toolkit.
//!
//! Supported formats:
//! - **FASTA** — read (via needletail) and 60-column wrapped write
//! - **PHYLIP** — fixed-width relaxed variant, read and write
//! - **JSON** — `{"data": {"names": [...], "seqs": [...]}}` read/write,
//!   plus the sample report emitted by stochastic sampling runs
//! - **Weight log** — append-only `source,model,weight` records
//! - **Rate matrix CSV** — branch length header plus 4096 codon-pair rows

pub mod fasta;
pub mod json;
pub mod matrix_csv;
pub mod phylip;
pub mod weights;

pub use fasta::{read_fasta, write_fasta};
pub use json::{read_json, write_json, write_sample_report};
pub use matrix_csv::read_rate_matrix;
pub use phylip::{read_phylip, write_phylip};
pub use weights::WeightLog;
