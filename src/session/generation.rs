//! Per-operation-class generation counters.
//!
//! Every asynchronous store operation advances the counter of its class at
//! dispatch and keeps the returned [`Ticket`]. After each await it commits
//! only if its ticket is still current; a newer dispatch of the same class
//! makes every older ticket stale. Stale results are dropped, never retried.

/// The independent classes of asynchronous work a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// `initialize_session` (location fix and initial address resolution).
    Session,
    /// Debounced text search.
    Search,
    /// Suggestion selection and manual pin placement.
    Selection,
    /// `use_current_location`.
    Locate,
}

/// Proof of dispatch for one operation: its class and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    class: OperationClass,
    generation: u64,
}

impl Ticket {
    pub fn class(&self) -> OperationClass {
        self.class
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Monotonic counters, one per [`OperationClass`].
#[derive(Debug, Default, Clone)]
pub struct GenerationCounters {
    session: u64,
    search: u64,
    selection: u64,
    locate: u64,
}

impl GenerationCounters {
    fn slot_mut(&mut self, class: OperationClass) -> &mut u64 {
        match class {
            OperationClass::Session => &mut self.session,
            OperationClass::Search => &mut self.search,
            OperationClass::Selection => &mut self.selection,
            OperationClass::Locate => &mut self.locate,
        }
    }

    fn slot(&self, class: OperationClass) -> u64 {
        match class {
            OperationClass::Session => self.session,
            OperationClass::Search => self.search,
            OperationClass::Selection => self.selection,
            OperationClass::Locate => self.locate,
        }
    }

    /// Starts a new generation for `class`, invalidating all older tickets.
    pub fn advance(&mut self, class: OperationClass) -> Ticket {
        let slot = self.slot_mut(class);
        *slot = slot.wrapping_add(1);
        Ticket {
            class,
            generation: *slot,
        }
    }

    /// Returns `true` if no newer operation of the ticket's class has started.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.slot(ticket.class) == ticket.generation
    }
}
