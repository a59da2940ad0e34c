//! # cmrsync Graph
//!
//! Neo4j integration for the CMR synchronizer.
//!
//! Provides the connection client and schema initialization, the
//! [`store::GraphStore`] mutation capability, and the record indexing and
//! deletion engines that keep the graph consistent with the catalog.

pub mod client;
pub mod delete;
pub mod index;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphCounts, GraphError, GraphResult};
pub use delete::{delete_collection, delete_linked_vertices, DeleteReport};
pub use index::{index_collection, EntityTally, IndexReport};
pub use store::{EdgeLabel, GraphStore, PropValue, Props, VertexLabel, VertexRef};
