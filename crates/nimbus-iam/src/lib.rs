//! Nimbus IAM - Access-Binding Reconciliation Orchestration
//!
//! The orchestration layer over `nimbus-core`: the per-resource updater
//! capability ([`ResourceIamUpdater`]) and its generic API-backed
//! implementation ([`ApiIamUpdater`]), the keyed lock registry that
//! serializes reconciliations per resource within one process
//! ([`KeyedLocks`]), the reconciler driving the lock → list → diff → apply
//! → read-back loop with conflict retry ([`IamReconciler`]), the
//! declarative intents the framework's binding/member resource forms reduce
//! to ([`BindingIntent`]), and the mutex-guarded credential cache
//! ([`TokenCache`]).
//!
//! Concurrency contract: reconciliations for different resources run in
//! parallel on the host framework's workers; reconciliations sharing a
//! mutex key serialize on the in-process lock, which is advisory and does
//! not fence out other processes or out-of-band API callers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api_updater;
pub mod intent;
pub mod lock;
pub mod reconciler;
pub mod token;
pub mod updater;

pub use api_updater::ApiIamUpdater;
pub use intent::BindingIntent;
pub use lock::KeyedLocks;
pub use reconciler::IamReconciler;
pub use token::{IamToken, TokenCache, TokenSource};
pub use updater::ResourceIamUpdater;
