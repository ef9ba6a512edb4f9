//! Deterministic directory tree walking.
//!
//! This crate provides the discovery half of tree replication:
//!
//! * A recursive walker that visits every entry in sorted-name order
//! * Per-entry stat and listing errors handed to the visitor instead of aborting
//! * A non-owning parent chain on every [`Node`] for relative path resolution
//! * A fast, unsorted tree estimate using `jwalk` for sizing progress bars
//!
//! # Example
//!
//! ```rust,ignore
//! use tree_mirror_paths::{walk, Node};
//!
//! walk("/data/source", |node: &Node<'_>, error| {
//!     match error {
//!         Some(error) => eprintln!("skipping {}: {error}", node.path.display()),
//!         None => println!("{}", node.relative_path().display()),
//!     }
//!     Ok(())
//! }, true)?;
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod count;
mod error;
mod node;
mod resolve;
mod walk;

pub use count::{TreeEstimate, estimate_tree};
pub use error::{EntryError, VisitError, WalkError};
pub use node::Node;
pub use resolve::resolve_absolute;
pub use walk::walk;
