//! Place resolution session store.
//!
//! This module holds the single mutable [`PlaceSession`] record of one picker
//! invocation and every operation that mutates it. The record and the
//! generation counters share one lock, so a dispatch (advance counter, set
//! busy flag) and a settle (check ticket, write result) are each applied as
//! a single atomic update. The lock is never held across an await.
//!
//! One store is created per picker; clones share the same session.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::services::PlaceServices;
use crate::Coordinates;

mod generation;
mod lifecycle;
mod search;
mod selection;
mod state;
mod ui;

#[cfg(test)]
mod tests;

pub use generation::{GenerationCounters, OperationClass, Ticket};
pub use state::{PlaceSession, QueryOrigin, SessionEvent};
pub use ui::DEFAULT_INTERACTION_GUARD_MS;

/// Capacity of the session event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Session record plus race-safety bookkeeping, guarded together.
#[derive(Debug)]
struct StoreInner {
    session: PlaceSession,
    generations: GenerationCounters,
}

/// Owner of one picker session.
///
/// Commands are either synchronous flag transitions or `async` operations
/// that resolve once every write they make has settled. No operation returns
/// an error: failures end up in the session's message fields.
///
/// # Example
///
/// ```
/// use place_picker::services::{FixtureServices, fixture::Fixture};
/// use place_picker::session::PlaceSessionStore;
/// use place_picker::Coordinates;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let origin = Coordinates::new(35.681236, 139.767125).unwrap();
///     let services = Arc::new(FixtureServices::new(Fixture::default()));
///     let store = PlaceSessionStore::new(services, origin);
///
///     store.initialize_session(origin, None, false).await;
///     let confirmed = store.build_confirm_selection("Not selected");
///     assert_eq!(confirmed.city_area, "Not selected");
/// }
/// ```
#[derive(Clone)]
pub struct PlaceSessionStore {
    inner: Arc<RwLock<StoreInner>>,
    services: Arc<dyn PlaceServices>,
    /// Change notifications for the facade and the presentation layer.
    update_tx: broadcast::Sender<SessionEvent>,
}

impl fmt::Debug for PlaceSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceSessionStore")
            .field("inner", &self.inner)
            .field("subscriber_count", &self.update_tx.receiver_count())
            .finish()
    }
}

impl PlaceSessionStore {
    /// Creates a store holding an idle session at `initial_coordinates`.
    ///
    /// The session's capability comes from the services' probe.
    pub fn new(services: Arc<dyn PlaceServices>, initial_coordinates: Coordinates) -> Self {
        let (update_tx, _rx) = broadcast::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);
        let session = PlaceSession::new(services.initial_places_api_status(), initial_coordinates);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                session,
                generations: GenerationCounters::default(),
            })),
            services,
            update_tx,
        }
    }

    /// Returns a copy of the current session record.
    pub fn snapshot(&self) -> PlaceSession {
        self.inner.read().session.clone()
    }

    /// Reads a projection of the session without cloning the whole record.
    pub fn read<R>(&self, f: impl FnOnce(&PlaceSession) -> R) -> R {
        f(&self.inner.read().session)
    }

    /// Subscribes to [`SessionEvent`] notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.update_tx.subscribe()
    }

    /// Returns the number of active event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.update_tx.receiver_count()
    }

    pub(crate) fn services(&self) -> &dyn PlaceServices {
        self.services.as_ref()
    }

    fn emit(&self, event: SessionEvent) {
        match self.update_tx.send(event) {
            Ok(count) => tracing::trace!("session event sent to {} subscribers", count),
            Err(_) => tracing::trace!("no subscribers for session event"),
        }
    }

    /// Applies a synchronous mutation.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut PlaceSession, &mut GenerationCounters) -> R,
    ) -> R {
        let mut inner = self.inner.write();
        let StoreInner {
            session,
            generations,
        } = &mut *inner;
        f(session, generations)
    }

    /// Advances `class` and applies the dispatch-time mutation atomically.
    fn begin(
        &self,
        class: OperationClass,
        f: impl FnOnce(&mut PlaceSession),
    ) -> Ticket {
        self.update(|session, generations| {
            let ticket = generations.advance(class);
            f(session);
            ticket
        })
    }

    /// Applies a settle-time mutation only if every ticket is still current.
    ///
    /// Returns `false` (and writes nothing) when any ticket went stale.
    fn commit(
        &self,
        tickets: &[Ticket],
        f: impl FnOnce(&mut PlaceSession, &mut GenerationCounters),
    ) -> bool {
        self.update(|session, generations| {
            if let Some(stale) = tickets.iter().find(|t| !generations.is_current(t)) {
                tracing::debug!(
                    "discarding stale {:?} result (generation {})",
                    stale.class(),
                    stale.generation()
                );
                return false;
            }
            f(session, generations);
            true
        })
    }
}
