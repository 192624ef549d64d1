//! # Attachment Safety
//!
//! Rendering a tooltip page may itself render links. Those nested links must
//! not get tooltips, or rendering could recurse without bound. Each render
//! owns one [`AttachmentSafety`]; rendering calls run inside
//! [`AttachmentSafety::suspend`] and link annotation checks
//! [`AttachmentSafety::is_allowed`] first.

use std::cell::Cell;

/// Per-render flag that gates tooltip attachment.
#[derive(Debug)]
pub struct AttachmentSafety {
    allowed: Cell<bool>,
}

impl AttachmentSafety {
    /// Creates a flag with attachment allowed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allowed: Cell::new(true),
        }
    }

    /// Returns true if links may get tooltips right now.
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed.get()
    }

    /// Disallows attachment until the guard is dropped. Nested guards restore
    /// whatever state they found.
    #[must_use = "attachment is restored as soon as the guard is dropped"]
    pub fn suspend(&self) -> SuspendGuard<'_> {
        let previous = self.allowed.replace(false);
        SuspendGuard {
            flag: self,
            previous,
        }
    }
}

impl Default for AttachmentSafety {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the attachment flag on drop.
#[derive(Debug)]
pub struct SuspendGuard<'a> {
    flag: &'a AttachmentSafety,
    previous: bool,
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        self.flag.allowed.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspend_and_restore() {
        let safety = AttachmentSafety::new();
        assert!(safety.is_allowed());
        {
            let _outer = safety.suspend();
            assert!(!safety.is_allowed());
            {
                let _inner = safety.suspend();
                assert!(!safety.is_allowed());
            }
            assert!(!safety.is_allowed(), "inner guard restores the suspended state");
        }
        assert!(safety.is_allowed());
    }
}
