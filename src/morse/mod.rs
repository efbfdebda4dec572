//! Morse symbol table, encoder and timing rules.

pub mod encoder;
pub mod table;
pub mod timing;

pub use encoder::{encode, format_preview, preview, Mark, Pattern, Sequence};
pub use timing::{MorseTiming, DEFAULT_UNIT_MS};
