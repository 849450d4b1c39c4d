//! Bookkeeping shared by the three entity stores.

use super::loading::LoadingFlag;
use super::observer::{ChangeKind, ChangeNotifier, StoreChange, StoreKind, Subscription};
use super::StoreError;
use crate::config::StoreConfig;
use crate::persist::PersistenceAdapter;
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

/// Version counter, flags, error signals and persistence handle of one store.
pub(crate) struct StoreCore {
    kind: StoreKind,
    adapter: PersistenceAdapter,
    config: StoreConfig,
    version: u64,
    loading: LoadingFlag,
    error: Option<String>,
    persist_error: Option<String>,
    /// Set while the durable collection could not be read into memory.
    load_failed: bool,
    notifier: ChangeNotifier,
}

impl StoreCore {
    pub(crate) fn new(kind: StoreKind, adapter: PersistenceAdapter, config: StoreConfig) -> Self {
        Self {
            kind,
            adapter,
            config,
            version: 0,
            loading: LoadingFlag::default(),
            error: None,
            persist_error: None,
            load_failed: false,
            notifier: ChangeNotifier::new(),
        }
    }

    pub(crate) fn adapter(&self) -> &PersistenceAdapter {
        &self.adapter
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn begin_loading(&mut self) {
        self.loading.begin(self.config.load_latency);
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub(crate) fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn persistence_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    /// Marks the durable collection as readable again.
    pub(crate) fn finish_load(&mut self) {
        self.load_failed = false;
    }

    /// Records a failed collection load.
    ///
    /// Until the next successful load, writes replace a payload that never
    /// made it into memory.
    pub(crate) fn fail_load(&mut self, operation: &'static str, err: StoreError) -> StoreError {
        self.load_failed = true;
        self.fail(operation, err)
    }

    /// Reads a selection cursor.
    ///
    /// An unreadable cursor loads as no selection and is kept as
    /// `persistence_error`; it never fails the collection load.
    pub(crate) fn load_cursor(&mut self, key: &str) -> Option<Uuid> {
        match self.adapter.load_cursor(key) {
            Ok(cursor) => cursor,
            Err(err) => {
                warn!(
                    "event=cursor_load module=store store={} status=error key={} error={}",
                    self.kind.as_str(),
                    key,
                    err
                );
                self.persist_error = Some(err.to_string());
                None
            }
        }
    }

    /// Records `err` as the readable error signal and hands it back.
    pub(crate) fn fail(&mut self, operation: &'static str, err: StoreError) -> StoreError {
        warn!(
            "event={} module=store store={} status=error error={}",
            operation,
            self.kind.as_str(),
            err
        );
        self.error = Some(err.to_string());
        err
    }

    /// Writes a collection, and optionally a cursor, back to storage.
    ///
    /// Failures are logged and kept as `persistence_error`; they never reach
    /// the caller and never roll back in-memory state.
    pub(crate) fn writeback<T: Serialize>(
        &mut self,
        key: &str,
        items: &[T],
        cursor: Option<(&str, Option<Uuid>)>,
    ) {
        if self.load_failed {
            warn!(
                "event=persist_write module=store store={} status=overwrite key={} reason=load_failed",
                self.kind.as_str(),
                key
            );
        }
        let mut failure = self
            .adapter
            .save_collection(key, items)
            .err()
            .map(|err| (key.to_string(), err));
        if failure.is_none() {
            self.load_failed = false;
        }
        if let Some((cursor_key, cursor)) = cursor {
            if let Err(err) = self.adapter.save_cursor(cursor_key, cursor) {
                if failure.is_none() {
                    failure = Some((cursor_key.to_string(), err));
                }
            }
        }

        match failure {
            None => self.persist_error = None,
            Some((failed_key, err)) => {
                warn!(
                    "event=persist_write module=store store={} status=error key={} error={}",
                    self.kind.as_str(),
                    failed_key,
                    err
                );
                self.persist_error = Some(err.to_string());
            }
        }
    }

    /// Publishes one committed transition.
    pub(crate) fn commit(&mut self, kind: ChangeKind) {
        self.version += 1;
        self.error = None;
        debug!(
            "event=store_commit module=store store={} status=ok version={} change={:?}",
            self.kind.as_str(),
            self.version,
            kind
        );
        self.notifier.emit(&StoreChange {
            store: self.kind,
            version: self.version,
            kind,
        });
    }

    pub(crate) fn subscribe(
        &self,
        listener: impl FnMut(&StoreChange) + 'static,
    ) -> Subscription {
        self.notifier.subscribe(listener)
    }
}
