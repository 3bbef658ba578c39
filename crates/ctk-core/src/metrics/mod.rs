//! Metrics emission.
//!
//! Events are recorded through the `metrics` facade. Nothing is exported
//! unless the embedding application installs a recorder.

pub mod events;

/// Macro for emitting metric events.
///
/// Calls `InternalEvent::emit()` on the given event, which records the
/// corresponding counter or histogram.
///
/// # Example
///
/// ```ignore
/// use cratedb_toolkit_core::metrics::events::ClusterDeployed;
///
/// emit!(ClusterDeployed { cluster: "testdrive".to_string() });
/// ```
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::metrics::events::InternalEvent::emit($event)
    };
}

pub use emit;
