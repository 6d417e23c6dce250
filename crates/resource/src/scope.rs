//! Scoped ownership of transient generation resources.
//!
//! A [`ResourceScope`] owns every decoded image, byte buffer and intermediate
//! object created while one document is generated. Callers hand a resource over
//! with [`ResourceScope::register`] and get back a shared read-only handle; the
//! scope alone runs the release closure. Closing runs deferred callbacks first
//! (registration order), then releases resources in reverse registration order.
//! A failing release never stops the remaining ones: failures are collected and
//! reported once, as a single [`ResourceCleanupError`].

use log::{debug, error, warn};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use thiserror::Error;

/// Error returned by a release closure or deferred callback.
pub type ReleaseError = Box<dyn std::error::Error + 'static>;

type ReleaseFn = Box<dyn FnOnce() -> Result<(), ReleaseError>>;

/// The closed set of resource categories the engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    RasterImage,
    ByteBuffer,
    Generic,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::RasterImage => "raster image",
            ResourceKind::ByteBuffer => "byte buffer",
            ResourceKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// One release or callback that failed during [`ResourceScope::close_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupFailure {
    /// `None` for deferred callbacks.
    pub kind: Option<ResourceKind>,
    pub label: String,
    pub message: String,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{} ({}): {}", self.label, kind, self.message),
            None => write!(f, "{} (callback): {}", self.label, self.message),
        }
    }
}

fn join_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Resource cleanup failed for {} item(s): {}", .failures.len(), join_failures(.failures))]
pub struct ResourceCleanupError {
    pub failures: Vec<CleanupFailure>,
}

/// What a successful (or partially successful) close did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    pub callbacks_run: usize,
    pub released: usize,
    pub by_kind: BTreeMap<ResourceKind, usize>,
}

struct ManagedResource {
    kind: ResourceKind,
    label: String,
    release: ReleaseFn,
}

struct DeferredCallback {
    description: String,
    callback: ReleaseFn,
}

pub struct ResourceScope {
    label: String,
    resources: Vec<ManagedResource>,
    deferred: Vec<DeferredCallback>,
    closed: bool,
}

impl fmt::Debug for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceScope")
            .field("label", &self.label)
            .field("resources", &self.resources.len())
            .field("deferred", &self.deferred.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl ResourceScope {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            resources: Vec::new(),
            deferred: Vec::new(),
            closed: false,
        }
    }

    /// Runs `body` inside a fresh scope and closes the scope afterwards,
    /// whatever the body returned.
    ///
    /// If the body failed, its error wins and any cleanup failure is only
    /// logged. If the body succeeded, a cleanup failure is returned through
    /// `E: From<ResourceCleanupError>`.
    pub fn run<T, E, F>(label: impl Into<String>, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut ResourceScope) -> Result<T, E>,
        E: From<ResourceCleanupError> + fmt::Display,
    {
        let mut scope = ResourceScope::new(label);
        let outcome = body(&mut scope);
        let cleanup = scope.close_all();

        match (outcome, cleanup) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(cleanup_err)) => Err(E::from(cleanup_err)),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(cleanup_err)) => {
                error!(
                    "Scope '{}': {} (suppressed while propagating: {})",
                    scope.label, cleanup_err, err
                );
                Err(err)
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Takes ownership of `resource`; the scope will call `release` exactly
    /// once when it closes. The returned handle points at the same value.
    pub fn register<T, F>(
        &mut self,
        resource: T,
        kind: ResourceKind,
        label: impl Into<String>,
        release: F,
    ) -> Rc<T>
    where
        T: 'static,
        F: FnOnce(&T) -> Result<(), ReleaseError> + 'static,
    {
        let label = label.into();
        let shared = Rc::new(resource);
        if self.closed {
            warn!(
                "Scope '{}' is closed; '{}' ({}) will not be released by it",
                self.label, label, kind
            );
            return shared;
        }

        let owned = Rc::clone(&shared);
        debug!("Scope '{}': registered {} '{}'", self.label, kind, label);
        self.resources.push(ManagedResource {
            kind,
            label,
            release: Box::new(move || release(&owned)),
        });
        shared
    }

    /// Registers a resource that needs no release action beyond being dropped.
    pub fn track<T: 'static>(&mut self, resource: T, kind: ResourceKind, label: impl Into<String>) -> Rc<T> {
        self.register(resource, kind, label, |_| Ok(()))
    }

    /// Queues a zero-argument callback that runs before any resource release.
    pub fn register_deferred<F>(&mut self, description: impl Into<String>, callback: F)
    where
        F: FnOnce() -> Result<(), ReleaseError> + 'static,
    {
        let description = description.into();
        if self.closed {
            warn!(
                "Scope '{}' is closed; deferred callback '{}' dropped",
                self.label, description
            );
            return;
        }
        self.deferred.push(DeferredCallback {
            description,
            callback: Box::new(callback),
        });
    }

    pub fn count(&self) -> usize {
        self.resources.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Histogram of currently registered resources by kind.
    pub fn summary(&self) -> BTreeMap<ResourceKind, usize> {
        let mut histogram = BTreeMap::new();
        for resource in &self.resources {
            *histogram.entry(resource.kind).or_insert(0) += 1;
        }
        histogram
    }

    /// Runs deferred callbacks, then releases resources newest-first.
    ///
    /// Every release is attempted. Closing an already closed scope is a no-op.
    pub fn close_all(&mut self) -> Result<CleanupReport, ResourceCleanupError> {
        if self.closed {
            debug!("Scope '{}' already closed", self.label);
            return Ok(CleanupReport::default());
        }
        self.closed = true;

        let mut report = CleanupReport::default();
        let mut failures = Vec::new();

        for deferred in self.deferred.drain(..) {
            match run_guarded(deferred.callback) {
                Ok(()) => report.callbacks_run += 1,
                Err(message) => {
                    error!(
                        "Scope '{}': deferred callback '{}' failed: {}",
                        self.label, deferred.description, message
                    );
                    failures.push(CleanupFailure {
                        kind: None,
                        label: deferred.description,
                        message,
                    });
                }
            }
        }

        for resource in self.resources.drain(..).rev() {
            *report.by_kind.entry(resource.kind).or_insert(0) += 1;
            match run_guarded(resource.release) {
                Ok(()) => report.released += 1,
                Err(message) => {
                    error!(
                        "Scope '{}': releasing {} '{}' failed: {}",
                        self.label, resource.kind, resource.label, message
                    );
                    failures.push(CleanupFailure {
                        kind: Some(resource.kind),
                        label: resource.label,
                        message,
                    });
                }
            }
        }

        debug!(
            "Scope '{}' closed: {} callback(s), {} release(s), {} failure(s)",
            self.label,
            report.callbacks_run,
            report.released,
            failures.len()
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(ResourceCleanupError { failures })
        }
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.close_all() {
            error!("Scope '{}' closed on drop with errors: {}", self.label, e);
        }
    }
}

fn run_guarded(f: ReleaseFn) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
