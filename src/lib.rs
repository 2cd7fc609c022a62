//! CV LaTeX compilation service.
//!
//! Fetches a LaTeX document from a Supabase RPC, publishes it as a temporary
//! GitHub Gist, has LaTeX.Online compile it from the Gist's raw URL and
//! returns the PDF over HTTP.

pub mod core;
pub mod logging;
pub mod utils;
pub mod web;

pub use web::start_web_server;
