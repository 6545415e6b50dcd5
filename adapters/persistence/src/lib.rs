#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save slot persistence for Grid Conquest.
//!
//! The world never touches storage itself. This adapter loads the single save
//! slot on startup, upgrades whatever schema it finds into a valid
//! [`GameSnapshot`], and writes every published snapshot back once the session
//! is hydrated.

mod codec;
mod store;
mod wire;

use grid_conquest_core::{Command, GameSnapshot};
use grid_conquest_world::{query, Game, RulesConfig};
use thiserror::Error;

pub use codec::{decode, encode, try_decode, CodecError, SAVE_VERSION};
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError, SLOT_FILE};

/// Errors raised while publishing a snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The snapshot could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The slot rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Session helper binding a save slot to a game.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    starting_resources: u32,
}

impl<S> Persistence<S>
where
    S: SnapshotStore,
{
    /// Wraps `store`, upgrading old saves with the balances of `rules`.
    #[must_use]
    pub fn new(store: S, rules: &RulesConfig) -> Self {
        Self {
            store,
            starting_resources: rules.starting_resources,
        }
    }

    /// Underlying save slot.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the saved snapshot, or `None` to start fresh.
    ///
    /// Unreadable slots and malformed saves are logged and treated as absent.
    #[must_use]
    pub fn load_or_fresh(&self) -> Option<GameSnapshot> {
        let bytes = match self.store.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "save slot unavailable, starting fresh");
                return None;
            }
        };
        decode(&bytes, self.starting_resources)
    }

    /// Command that hydrates a session from the save slot.
    #[must_use]
    pub fn hydrate_command(&self) -> Command {
        Command::Hydrate {
            snapshot: self.load_or_fresh().map(Box::new),
        }
    }

    /// Saves the published snapshot of `game`. Returns whether anything was written.
    ///
    /// Nothing is written until the session has hydrated, so a fresh game
    /// never overwrites a save that has not been read yet.
    pub fn publish(&mut self, game: &Game) -> Result<bool, PersistenceError> {
        if !query::is_hydrated(game) {
            return Ok(false);
        }
        let bytes = encode(query::snapshot(game))?;
        self.store.save(&bytes)?;
        Ok(true)
    }

    /// Empties the save slot.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }
}
