//! URL and domain helpers for Mind-Digest
//!
//! Domains are the join key between configured sites and registered
//! crawlers, so every component normalizes them the same way.

mod domain;

pub use domain::{extract_domain, normalize_domain};
