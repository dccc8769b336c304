//! Event types for session change notifications.
//!
//! The session appends an event whenever the live table changes; the view
//! drains them after each UI event and repaints from the new table.

use crate::history::OpKind;

/// Events emitted by [`crate::session::EditSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A mutation was applied and recorded in history.
    Changed(ChangeEvent),

    /// The live table was rolled back one step.
    Undone(ChangeEvent),

    /// An undone step was re-applied.
    Redone(ChangeEvent),

    /// A new table replaced the live one (new, open, load). History was cleared.
    Opened { rows: usize, cols: usize },

    /// The document was closed.
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Session revision after this change.
    pub revision: u64,
    pub op: OpKind,
    /// Rows/columns were added, removed or renamed; cached coordinates are invalid.
    pub structural: bool,
}

impl SessionEvent {
    /// Whether the view must rebuild its headers, not just repaint cells.
    pub fn is_structural(&self) -> bool {
        match self {
            SessionEvent::Changed(c) | SessionEvent::Undone(c) | SessionEvent::Redone(c) => {
                c.structural
            }
            SessionEvent::Opened { .. } | SessionEvent::Closed => true,
        }
    }
}

/// Queue of pending events. It grows until drained, so front ends drain it
/// after every operation they run.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SessionEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_drain() {
        let mut collector = EventCollector::new();
        collector.push(SessionEvent::Opened { rows: 2, cols: 2 });
        collector.push(SessionEvent::Changed(ChangeEvent {
            revision: 2,
            op: OpKind::EditCell,
            structural: false,
        }));

        assert_eq!(collector.len(), 2);
        let drained = collector.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].is_structural());
        assert!(!drained[1].is_structural());
        assert!(collector.is_empty());
    }
}
