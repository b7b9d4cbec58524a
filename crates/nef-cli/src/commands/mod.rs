//! Command implementations.
//!
//! Each command returns the text to print; nothing is written to stdout here.

pub mod fasta;
pub mod frames;
pub mod header;

pub use self::fasta::execute_fasta_sequence;
pub use self::frames::execute_frames_list;
pub use self::header::execute_header;
