//! The static opcode signature table: for every mnemonic, which operand
//! types it accepts. The parser consults this to decide how to parse an
//! instruction's trailing operand (spec.md §4.5); `sam-runtime` doesn't
//! use it directly (it binds handlers by name separately), but keeping
//! the signature table name-keyed rather than numeric matches how both
//! sides of this crate boundary key their tables.

use std::collections::HashMap;
use std::sync::Once;

use bitflags::bitflags;

bitflags! {
    /// Which operand types a given opcode's trailing operand may carry.
    /// An opcode with an empty mask takes no operand at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OperandTypeMask: u8 {
        const INT   = 1 << 0;
        const FLOAT = 1 << 1;
        const CHAR  = 1 << 2;
        const LABEL = 1 << 3;
        const STR   = 1 << 4;
    }
}

static INIT: Once = Once::new();
static mut SIGNATURES: Option<HashMap<&'static str, OperandTypeMask>> = None;

fn build() -> HashMap<&'static str, OperandTypeMask> {
    use OperandTypeMask as M;
    let none = M::empty();
    let mut table = HashMap::new();

    let mut add = |name: &'static str, mask: M| {
        table.insert(name, mask);
    };

    add("FTOI", none);
    add("FTOIR", none);
    add("ITOF", none);
    add("PUSHIMM", M::INT);
    add("PUSHIMMF", M::FLOAT);
    add("PUSHIMMCH", M::CHAR);
    add("PUSHIMMMA", M::INT);
    add("PUSHIMMPA", M::LABEL | M::INT);
    add("PUSHIMMSTR", M::STR);
    add("PUSHSP", none);
    add("PUSHFBR", none);
    add("POPSP", none);
    add("POPFBR", none);
    add("DUP", none);
    add("SWAP", none);
    add("ADDSP", M::INT);
    add("MALLOC", none);
    add("FREE", none);
    add("PUSHIND", none);
    add("STOREIND", none);
    add("PUSHABS", M::INT);
    add("STOREABS", M::INT);
    add("PUSHOFF", M::INT);
    add("STOREOFF", M::INT);
    add("ADD", none);
    add("SUB", none);
    add("TIMES", none);
    add("DIV", none);
    add("MOD", none);
    add("ADDF", none);
    add("SUBF", none);
    add("TIMESF", none);
    add("DIVF", none);
    add("LSHIFT", M::INT);
    add("LSHIFTIND", none);
    add("RSHIFT", M::INT);
    add("RSHIFTIND", none);
    add("LRSHIFT", M::INT);
    add("LRSHIFTIND", none);
    add("AND", none);
    add("OR", none);
    add("NAND", none);
    add("NOR", none);
    add("XOR", none);
    add("NOT", none);
    add("BITAND", none);
    add("BITOR", none);
    add("BITNAND", none);
    add("BITNOR", none);
    add("BITXOR", none);
    add("BITNOT", none);
    add("CMP", none);
    add("CMPF", none);
    add("GREATER", none);
    add("LESS", none);
    add("EQUAL", none);
    add("ISNIL", none);
    add("ISPOS", none);
    add("ISNEG", none);
    add("JUMP", M::LABEL | M::INT);
    add("JUMPC", M::LABEL | M::INT);
    add("JUMPIND", none);
    add("RST", none);
    add("JSR", M::LABEL | M::INT);
    add("JSRIND", none);
    add("SKIP", none);
    add("LINK", none);
    add("UNLINK", none);
    add("READ", none);
    add("READF", none);
    add("READCH", none);
    add("READSTR", none);
    add("WRITE", none);
    add("WRITEF", none);
    add("WRITECH", none);
    add("WRITESTR", none);
    add("STOP", none);
    add("patoi", none);

    table
}

/// Looks up the operand-type mask an opcode accepts. Returns `None` for
/// an unrecognized mnemonic; the parser turns that into a `ParseError`.
pub fn lookup_signature(name: &str) -> Option<OperandTypeMask> {
    // SAFETY: `INIT.call_once` guarantees single-threaded initialization
    // of `SIGNATURES` before any read, matching the teacher's
    // `instruction_property.rs` table-building idiom.
    unsafe {
        INIT.call_once(|| {
            SIGNATURES = Some(build());
        });
        SIGNATURES.as_ref().unwrap().get(name).copied()
    }
}

/// Every recognized opcode mnemonic, in table order. Used by the CLI's
/// `--list-opcodes` style introspection and by parser tests that want
/// to exercise the full instruction set without hand-maintaining a
/// second list.
pub fn all_mnemonics() -> Vec<&'static str> {
    unsafe {
        INIT.call_once(|| {
            SIGNATURES = Some(build());
        });
        SIGNATURES.as_ref().unwrap().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_opcode_resolves() {
        assert_eq!(lookup_signature("PUSHIMM"), Some(OperandTypeMask::INT));
        assert_eq!(lookup_signature("STOP"), Some(OperandTypeMask::empty()));
    }

    #[test]
    fn pushimmpa_accepts_either_label_or_int() {
        let mask = lookup_signature("PUSHIMMPA").unwrap();
        assert!(mask.contains(OperandTypeMask::LABEL));
        assert!(mask.contains(OperandTypeMask::INT));
    }

    #[test]
    fn unknown_opcode_is_none() {
        assert_eq!(lookup_signature("NOTANOPCODE"), None);
    }

    #[test]
    fn table_covers_every_documented_mnemonic() {
        assert!(all_mnemonics().len() >= 70);
    }
}
