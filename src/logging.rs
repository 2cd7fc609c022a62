// src/logging.rs
//! Logging macros shared by the whole crate.
//!
//! Every event goes through `tracing` under the `cv_latex` target so a single
//! `EnvFilter` directive (`cv_latex=debug`) controls the service's own output
//! independently of Rocket and reqwest.

/// Log an event at the given level: `app_log!(info, "Compiled {} bytes", n)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!(target: "cv_latex", $($arg)+)
    };
}

/// Open an info-level span: `app_span!("generate_cv", rpc = %name)`.
#[macro_export]
macro_rules! app_span {
    ($name:expr) => {
        ::tracing::info_span!(target: "cv_latex", $name)
    };
    ($name:expr, $($fields:tt)+) => {
        ::tracing::info_span!(target: "cv_latex", $name, $($fields)+)
    };
}
