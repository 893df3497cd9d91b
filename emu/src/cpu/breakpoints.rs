//! Breakpoint registry: a growable arena of address/active pairs,
//! addressed by stable index from the console and checked once per fetch
//! cycle by the run loop.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub address: u32,
    pub active: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Breakpoints {
    entries: Vec<Breakpoint>,
}

impl Breakpoints {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Arms a breakpoint. Adding an address that already has an entry
    /// re-arms that entry instead of growing the list.
    pub fn add(&mut self, address: u32) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|b| b.address == address) {
            entry.active = true;
            return true;
        }
        self.entries.push(Breakpoint {
            address,
            active: true,
        });
        true
    }

    /// Removes the entry at `index`; later indices shift down.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    /// Flips the entry at `index` between armed and disarmed.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.active = !entry.active;
                true
            }
            None => false,
        }
    }

    /// One-shot hit test: an armed entry matching `address` reports the
    /// hit and disarms itself until re-armed.
    pub fn check(&mut self, address: u32) -> bool {
        for entry in &mut self.entries {
            if entry.active && entry.address == address {
                entry.active = false;
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn list(&self) -> &[Breakpoint] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_check_auto_deactivates() {
        let mut breakpoints = Breakpoints::new();
        assert!(breakpoints.add(0x0200_0010));

        assert!(!breakpoints.check(0x0200_000C));
        assert!(breakpoints.check(0x0200_0010));

        // one-shot: a second pass does not re-trigger
        assert!(!breakpoints.check(0x0200_0010));
        assert_eq!(
            breakpoints.list(),
            &[Breakpoint {
                address: 0x0200_0010,
                active: false
            }]
        );
    }

    #[test]
    fn adding_an_existing_address_re_arms_it() {
        let mut breakpoints = Breakpoints::new();
        breakpoints.add(0x100);
        assert!(breakpoints.check(0x100));

        breakpoints.add(0x100);
        assert_eq!(breakpoints.len(), 1);
        assert!(breakpoints.check(0x100));
    }

    #[test]
    fn toggle_by_index() {
        let mut breakpoints = Breakpoints::new();
        breakpoints.add(0x100);
        breakpoints.add(0x200);

        assert!(breakpoints.toggle(0));
        assert!(!breakpoints.check(0x100));
        assert!(breakpoints.check(0x200));

        assert!(breakpoints.toggle(0));
        assert!(breakpoints.check(0x100));

        assert!(!breakpoints.toggle(7));
    }

    #[test]
    fn remove_by_index() {
        let mut breakpoints = Breakpoints::new();
        breakpoints.add(0x100);
        breakpoints.add(0x200);

        assert!(breakpoints.remove(0));
        assert_eq!(breakpoints.len(), 1);
        assert_eq!(breakpoints.list()[0].address, 0x200);

        assert!(!breakpoints.remove(5));
        assert!(breakpoints.remove(0));
        assert!(breakpoints.is_empty());
    }
}
