//! The current compare selection of a version page.
//!
//! Every selection change bumps a generation. A comparison started for one
//! generation is only applied while that generation is still current;
//! results of superseded comparisons are dropped.

use std::future::Future;

use tokio::sync::watch;
use tracing::warn;
use vellum_types::{CompareSelection, LocaleCode};

/// Identity of one requested comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionKey {
    pub generation: u64,
    pub selection: CompareSelection,
    pub locales: Vec<LocaleCode>,
}

pub struct CompareSession {
    tx: watch::Sender<SelectionKey>,
}

impl CompareSession {
    pub fn new(selection: CompareSelection, locales: Vec<LocaleCode>) -> Self {
        let (tx, _rx) = watch::channel(SelectionKey {
            generation: 0,
            selection,
            locales,
        });
        Self { tx }
    }

    /// Change the selection. Returns the key of the new comparison.
    pub fn select(&self, selection: CompareSelection, locales: Vec<LocaleCode>) -> SelectionKey {
        self.tx.send_modify(|key| {
            key.generation += 1;
            key.selection = selection;
            key.locales = locales;
        });
        self.current()
    }

    pub fn current(&self) -> SelectionKey {
        self.tx.borrow().clone()
    }

    pub fn is_current(&self, key: &SelectionKey) -> bool {
        self.tx.borrow().generation == key.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionKey> {
        self.tx.subscribe()
    }

    /// Keep `result` only if `key` is still the current selection.
    pub fn apply<T>(&self, key: &SelectionKey, result: T) -> Option<T> {
        if self.is_current(key) {
            Some(result)
        } else {
            warn!(
                generation = key.generation,
                current = self.tx.borrow().generation,
                compare = %key.selection,
                "discarding stale comparison"
            );
            None
        }
    }

    /// Drive `comparison` for `key`, abandoning it as soon as the selection
    /// changes.
    pub async fn run<F, T>(&self, key: &SelectionKey, comparison: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let mut rx = self.subscribe();
        tokio::select! {
            result = comparison => self.apply(key, result),
            _ = superseded(&mut rx, key.generation) => {
                warn!(
                    generation = key.generation,
                    compare = %key.selection,
                    "comparison superseded"
                );
                None
            }
        }
    }
}

async fn superseded(rx: &mut watch::Receiver<SelectionKey>, generation: u64) {
    loop {
        if rx.borrow_and_update().generation != generation {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
