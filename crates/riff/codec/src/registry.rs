//! Registry of per-identifier content decoders

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use parking_lot::RwLock;
use riffle_primitives::ChunkId;
use tracing::debug;

use crate::content::Content;
use crate::error::{BoxError, Error, Result};

/// Type-erased decoder stored in the registry
pub(crate) type DecodeFn =
    dyn Fn(&mut dyn Read) -> std::result::Result<Content, BoxError> + Send + Sync;

/// Map from leaf identifier to the decoder run on its payload.
///
/// Lookups take a shared lock and registrations an exclusive one, so many
/// decodes can consult the registry while another thread installs a decoder.
/// The lock is released before a decoder runs.
#[derive(Default)]
pub struct ContentRegistry {
    decoders: RwLock<HashMap<ChunkId, Arc<DecodeFn>>>,
}

impl ContentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `decoder` for leaves tagged `id`, replacing any previous one.
    ///
    /// The decoder receives a reader over exactly the leaf's payload bytes.
    /// Fails with [`Error::ReservedIdentifier`] for `RIFF` and `LIST`, leaving
    /// the registry untouched.
    pub fn register<T, F>(&self, id: ChunkId, decoder: F) -> Result<()>
    where
        T: Any + Send + Sync,
        F: Fn(&mut dyn Read) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        if id.is_reserved() {
            return Err(Error::ReservedIdentifier(id));
        }

        let decoder: Arc<DecodeFn> =
            Arc::new(move |src: &mut dyn Read| decoder(src).map(Content::new));
        let replaced = self.decoders.write().insert(id, decoder).is_some();

        debug!(%id, replaced, "Registered content decoder");
        Ok(())
    }

    /// Remove the decoder for `id`. Returns whether one was installed.
    pub fn unregister(&self, id: &ChunkId) -> bool {
        let removed = self.decoders.write().remove(id).is_some();
        if removed {
            debug!(%id, "Unregistered content decoder");
        }
        removed
    }

    /// Check whether a decoder is installed for `id`
    pub fn contains(&self, id: &ChunkId) -> bool {
        self.decoders.read().contains_key(id)
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> Vec<ChunkId> {
        let mut ids: Vec<_> = self.decoders.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered decoders
    pub fn len(&self) -> usize {
        self.decoders.read().len()
    }

    /// Check whether no decoders are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get(&self, id: &ChunkId) -> Option<Arc<DecodeFn>> {
        self.decoders.read().get(id).cloned()
    }
}

impl fmt::Debug for ContentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
