//! AHU Core Types and Definitions
//!
//! This crate provides the foundational types shared by the air-handling unit
//! family builder. It includes:
//!
//! - **Identifiers**: String-interned segment and child identifiers ([`identifier::Id`])
//! - **Geometry**: Points, vectors, bounds and rigid transforms ([`geometry`] module)
//! - **Sketch**: Closed line/arc outlines on sketch planes ([`sketch`] module)
//! - **Segment**: Catalogue segment descriptors and cut derivation ([`segment`] module)
//! - **Host**: The CAD document surface the engines drive ([`host::Host`])
//! - **Document**: An in-memory host implementation ([`document::Document`])

pub mod document;
pub mod geometry;
pub mod host;
pub mod identifier;
pub mod segment;
pub mod sketch;
