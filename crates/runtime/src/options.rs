//! Runtime options (spec.md §6/§7), a single `Quiet` flag today but
//! kept as a bitflags set the way `sam_options` is in the original
//! (`examples/original_source/src/include/libsam/types.h`) so a future
//! flag doesn't force a representation change.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Options: u8 {
        /// Suppresses stderr diagnostic text; does not change exit
        /// codes or the backtrace flag (spec.md §7).
        const QUIET = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_is_off_by_default() {
        assert!(!Options::default().contains(Options::QUIET));
    }
}
