//! The change journal: a FIFO log of stack/heap mutations an embedder
//! drains between instructions, mirroring `sam_es_change`/
//! `sam_es_change_get` (`examples/original_source/src/include/libsam/es.h`).
//! Each executed instruction appends zero or more `Change`s; `take_next`
//! pops them off in the order they were recorded.

use std::collections::VecDeque;

use sam_types::{Ma, Ml};

/// What happened to a cell: `Added`/`Removed` track stack growth and
/// shrinkage (`push`/`pop`, `malloc`/`free`); `Set` tracks an
/// in-place overwrite (`STOREIND` and friends). `Added.size` carries
/// the cell count of a heap allocation (`None` for a plain stack push,
/// which always adds exactly one cell) so a journal replay can
/// reconstruct a multi-cell `malloc` without re-deriving its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    Added {
        at: Ma,
        value: Ml,
        size: Option<usize>,
    },
    Removed { at: Ma, size: usize },
    Set { at: Ma, value: Ml },
}

#[derive(Debug, Default)]
pub struct ChangeJournal {
    pending: VecDeque<Change>,
}

impl ChangeJournal {
    pub fn new() -> Self {
        ChangeJournal {
            pending: VecDeque::new(),
        }
    }

    pub fn record(&mut self, change: Change) {
        self.pending.push_back(change);
    }

    /// Pops the oldest unconsumed change, matching `sam_es_change_get`'s
    /// one-at-a-time draining contract. Returns `None` once the journal
    /// is empty.
    pub fn take_next(&mut self) -> Option<Change> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sam_types::Sa;

    #[test]
    fn changes_drain_in_fifo_order() {
        let mut journal = ChangeJournal::new();
        journal.record(Change::Added {
            at: Ma::Stack(Sa(0)),
            value: Ml::Int(1),
            size: None,
        });
        journal.record(Change::Added {
            at: Ma::Stack(Sa(1)),
            value: Ml::Int(2),
            size: None,
        });

        assert_eq!(
            journal.take_next(),
            Some(Change::Added {
                at: Ma::Stack(Sa(0)),
                value: Ml::Int(1),
                size: None,
            })
        );
        assert_eq!(journal.len(), 1);
        assert_eq!(
            journal.take_next(),
            Some(Change::Added {
                at: Ma::Stack(Sa(1)),
                value: Ml::Int(2),
                size: None,
            })
        );
        assert!(journal.is_empty());
        assert_eq!(journal.take_next(), None);
    }
}
