//! Current set with bounded undo/redo history

use std::collections::VecDeque;

use crate::error::Result;
use crate::pcset::{PcSet, PitchClass};

/// Entries kept on each history stack
pub const HISTORY_DEPTH: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct Session {
    current: PcSet,
    undo: VecDeque<PcSet>,
    redo: VecDeque<PcSet>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PcSet {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Flip one pitch class
    pub fn toggle(&mut self, pc: PitchClass) -> Result<()> {
        let mut next = self.current;
        if !next.insert(pc)? {
            next.remove(pc)?;
        }
        self.replace(next);
        Ok(())
    }

    /// Switch a pitch class on or off, as a MIDI key would
    pub fn set_pitch_class(&mut self, pc: PitchClass, on: bool) -> Result<bool> {
        let mut next = self.current;
        let changed = if on { next.insert(pc)? } else { next.remove(pc)? };
        Ok(changed && self.replace(next))
    }

    /// Make `set` current, archiving the previous value. Returns false and
    /// leaves the history alone when nothing changes.
    pub fn replace(&mut self, set: PcSet) -> bool {
        if set == self.current {
            return false;
        }
        push_bounded(&mut self.undo, self.current);
        self.redo.clear();
        self.current = set;
        true
    }

    pub fn transpose_by(&mut self, n: u8) -> bool {
        self.replace(self.current.transpose(n))
    }

    pub fn invert_by(&mut self, n: u8) -> bool {
        self.replace(self.current.invert(n))
    }

    /// Clear the set; the cleared value stays undoable
    pub fn reset(&mut self) -> bool {
        self.replace(PcSet::new())
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        push_bounded(&mut self.redo, self.current);
        self.current = previous;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };
        push_bounded(&mut self.undo, self.current);
        self.current = next;
        true
    }
}

fn push_bounded(stack: &mut VecDeque<PcSet>, set: PcSet) {
    if stack.len() == HISTORY_DEPTH {
        stack.pop_front();
    }
    stack.push_back(set);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pcs: &[u8]) -> PcSet {
        PcSet::from_pcs(pcs.iter().copied()).unwrap()
    }

    #[test]
    fn test_toggle_and_undo() {
        let mut session = Session::new();
        session.toggle(0).unwrap();
        session.toggle(4).unwrap();
        session.toggle(7).unwrap();
        assert_eq!(session.current(), set(&[0, 4, 7]));

        session.toggle(4).unwrap();
        assert_eq!(session.current(), set(&[0, 7]));

        assert!(session.undo());
        assert_eq!(session.current(), set(&[0, 4, 7]));
        assert!(session.redo());
        assert_eq!(session.current(), set(&[0, 7]));
        assert!(!session.redo());
    }

    #[test]
    fn test_toggle_rejects_out_of_range() {
        let mut session = Session::new();
        assert!(session.toggle(12).is_err());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut session = Session::new();
        session.replace(set(&[0, 4, 7]));
        session.transpose_by(2);
        assert!(session.undo());
        assert!(session.can_redo());
        session.invert_by(0);
        assert!(!session.can_redo());
        assert_eq!(session.current(), set(&[0, 5, 8]));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = Session::new();
        for pc in 0..12 {
            session.toggle(pc).unwrap();
        }
        let mut undone = 0;
        while session.undo() {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_DEPTH);
        // The two oldest states fell off the bottom
        assert_eq!(session.current(), set(&[0, 1]));

        let mut redone = 0;
        while session.redo() {
            redone += 1;
        }
        assert_eq!(redone, HISTORY_DEPTH);
        assert_eq!(session.current(), PcSet::chromatic());
    }

    #[test]
    fn test_unchanged_values_are_not_archived() {
        let mut session = Session::new();
        assert!(!session.reset());
        assert!(!session.replace(PcSet::new()));
        assert!(!session.can_undo());

        session.replace(set(&[0, 4, 8]));
        assert!(!session.transpose_by(4));
        assert!(!session.set_pitch_class(4, true).unwrap());
        assert!(session.set_pitch_class(4, false).unwrap());
        assert!(session.undo());
        assert!(session.undo());
        assert!(!session.undo());
        assert_eq!(session.current(), PcSet::new());
    }

    #[test]
    fn test_reset_is_undoable() {
        let mut session = Session::new();
        session.replace(set(&[1, 2, 3]));
        assert!(session.reset());
        assert!(session.current().is_empty());
        session.undo();
        assert_eq!(session.current(), set(&[1, 2, 3]));
    }
}
