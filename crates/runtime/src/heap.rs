//! The heap: a vector of allocations, each either live (a `Vec<Ml>`) or
//! a tombstone left behind by `FREE`. `malloc` scans for a tombstone to
//! reuse before growing the vector — the first-fit reuse scan from
//! `sam_es_heap_alloc` (`examples/original_source/src/libsam/es.c`).

use sam_types::{Ha, Ml};

/// A soft ceiling on total allocations, standing in for `malloc`
/// failure in the original (which only fails when the C heap itself is
/// exhausted). Without some ceiling `MALLOC`'s `NoMemory` path is
/// dead code.
pub const HEAP_ALLOC_MAX: usize = 1 << 20;

#[derive(Debug)]
enum Allocation {
    Tombstone,
    Live(Vec<Ml>),
}

#[derive(Debug, Default)]
pub struct Heap {
    allocations: Vec<Allocation>,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            allocations: Vec::new(),
        }
    }

    /// Allocates `size` cells (minimum 1, matching `MALLOC`'s
    /// 0-coerces-to-1 rule applied by the caller), reusing the first
    /// tombstone slot found. Returns `None` when the ceiling is hit.
    pub fn alloc(&mut self, size: usize) -> Option<Ha> {
        let cells = vec![Ml::None; size];
        for (alloc_id, slot) in self.allocations.iter_mut().enumerate() {
            if matches!(slot, Allocation::Tombstone) {
                *slot = Allocation::Live(cells);
                return Some(Ha::new(alloc_id, 0));
            }
        }
        if self.allocations.len() >= HEAP_ALLOC_MAX {
            return None;
        }
        self.allocations.push(Allocation::Live(cells));
        Some(Ha::new(self.allocations.len() - 1, 0))
    }

    /// `FREE` requires the address to point at the start of a live
    /// allocation (`ha.index != 0` fails in the original); anything
    /// else, or a double free, is a `Free` error to the caller.
    pub fn dealloc(&mut self, ha: Ha) -> bool {
        if ha.offset != 0 {
            return false;
        }
        match self.allocations.get_mut(ha.alloc_id) {
            Some(slot @ Allocation::Live(_)) => {
                *slot = Allocation::Tombstone;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, ha: Ha) -> Option<Ml> {
        match self.allocations.get(ha.alloc_id)? {
            Allocation::Live(words) => words.get(ha.offset).copied(),
            Allocation::Tombstone => None,
        }
    }

    pub fn set(&mut self, ha: Ha, value: Ml) -> bool {
        match self.allocations.get_mut(ha.alloc_id) {
            Some(Allocation::Live(words)) => match words.get_mut(ha.offset) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }

    /// How many cells live in the allocation `ha` belongs to, used by
    /// `WRITESTR`'s bounds check and leak reporting at teardown.
    pub fn allocation_len(&self, alloc_id: usize) -> Option<usize> {
        match self.allocations.get(alloc_id)? {
            Allocation::Live(words) => Some(words.len()),
            Allocation::Tombstone => None,
        }
    }

    /// Allocation ids still live when the program ends, for the
    /// teardown leak report (SPEC_FULL.md's ambient-stack supplement).
    pub fn live_allocations(&self) -> Vec<usize> {
        self.allocations
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| matches!(slot, Allocation::Live(_)).then_some(id))
            .collect()
    }
}
