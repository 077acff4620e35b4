//! Structured-result tree.
//!
//! vasprun.xml is, for our purposes, a read-only tree of labeled nodes with
//! whitespace-separated numeric text at the leaves. This module provides the
//! untyped tree and the four query operations the data layer is built on:
//! first node at a path, all nodes at a path, matching children of a node,
//! and leaf text. Nothing here knows about k-points or bands.

pub mod dom;
pub mod parse;

pub use dom::{Document, Element};
pub use parse::{parse, XmlParseError};
