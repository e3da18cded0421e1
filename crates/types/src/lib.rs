//! Shared value model, error taxonomy and opcode signature table for the
//! SaM abstract machine. Everything here is pure data: no execution state,
//! no I/O, no handlers. `sam-parser` and `sam-runtime` both build on top
//! of it.

pub mod error;
pub mod opcode_table;
pub mod value;

pub use error::SamError;
pub use opcode_table::{lookup_signature, OperandTypeMask};
pub use value::{float_eq, Ha, Ma, Ml, OperandValue, Pa, Sa};
