//! Reference-counted ownership of the inventory client.
//!
//! The provider client is expensive to construct and shared by every
//! concurrent discovery attempt. [`ClientHandle`] tracks outstanding borrows
//! with a single atomic counter seeded with one owner reference; the counter
//! reaching zero *is* the shutdown point, so the decrement and the
//! "did we hit zero" check are one atomic decision. The underlying client's
//! [`shutdown`](crate::provider::InstanceInventory::shutdown) runs exactly
//! once, at that transition.

use crate::provider::InstanceInventory;
use ecs_discovery_core::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared, reference-counted handle to the inventory client.
///
/// Cloning the handle shares state without touching the borrow count; only
/// [`acquire`](ClientHandle::acquire) and dropping a [`ClientBorrow`] move
/// the count.
#[derive(Clone)]
pub struct ClientHandle {
    shared: Arc<Shared>,
}

struct Shared {
    inventory: Arc<dyn InstanceInventory>,
    // Outstanding borrows plus, until request_shutdown, one owner reference.
    // Zero means shutdown has begun and no borrow may be granted.
    refs: AtomicUsize,
    shutdown_requested: AtomicBool,
}

impl Shared {
    fn release(&self) {
        if self.refs.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("last reference released, shutting down inventory client");
            self.inventory.shutdown();
        }
    }
}

impl ClientHandle {
    /// Wrap an inventory client in a fresh handle holding the owner
    /// reference.
    #[must_use]
    pub fn new(inventory: Arc<dyn InstanceInventory>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inventory,
                refs: AtomicUsize::new(1),
                shutdown_requested: AtomicBool::new(false),
            }),
        }
    }

    /// Borrow the inventory client for one discovery attempt.
    ///
    /// The returned [`ClientBorrow`] releases the borrow when dropped, on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientClosed`] if shutdown has already begun; the
    /// caller must construct a new handle if discovery is still needed.
    pub fn acquire(&self) -> Result<ClientBorrow> {
        let mut current = self.shared.refs.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Err(Error::ClientClosed);
            }
            match self.shared.refs.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Ok(ClientBorrow {
                        shared: Arc::clone(&self.shared),
                    })
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Mark the handle for shutdown by dropping the owner reference.
    ///
    /// Shuts the client down immediately when no borrows are outstanding;
    /// otherwise shutdown fires when the last borrower releases. Calling
    /// this more than once has no further effect.
    pub fn request_shutdown(&self) {
        if !self.shared.shutdown_requested.swap(true, Ordering::AcqRel) {
            debug!("client shutdown requested");
            self.shared.release();
        }
    }

    /// Returns true once shutdown has begun and borrows are no longer
    /// granted.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.refs.load(Ordering::Acquire) == 0
    }
}

/// Scoped borrow of the inventory client.
///
/// All inventory calls are permitted through
/// [`inventory`](ClientBorrow::inventory) except shutdown, which belongs to
/// the handle. Dropping the borrow releases it exactly once.
pub struct ClientBorrow {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ClientBorrow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBorrow").finish_non_exhaustive()
    }
}

impl ClientBorrow {
    /// Access the borrowed inventory client.
    #[must_use]
    pub fn inventory(&self) -> &dyn InstanceInventory {
        self.shared.inventory.as_ref()
    }
}

impl Drop for ClientBorrow {
    fn drop(&mut self) {
        self.shared.release();
    }
}
