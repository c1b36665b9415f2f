//! Reference graphs and change-impact resolution for Kustomize trees.
//!
//! Extracts the references each `kustomization.yaml` declares ([`unit`]),
//! assembles and inverts the reference graph ([`graph`]), and climbs it from a
//! changed file to the root overlays that include it ([`resolve`]). The
//! [`discover`], [`render`] and [`diff`] modules drive rendered-output diffs
//! across two checkouts.

pub mod config;
pub mod diff;
pub mod discover;
pub mod error;
pub mod graph;
pub mod paths;
pub mod render;
pub mod resolve;
pub mod unit;

pub use error::{KdepError, Result};
pub use graph::RefGraph;
pub use resolve::find_parents;
