//! Error types for BVH construction and mesh extraction.

use thiserror::Error;

/// Errors raised while turning mesh buffers into primitives or configuring
/// a build. Ray misses and empty geometry are not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccelError {
    /// The flat vertex array does not hold whole `xyz` triples.
    #[error("vertex array length {0} is not a multiple of 3")]
    VertexArrayLength(usize),

    /// The index (or non-indexed vertex) count does not form whole triangles.
    #[error("{0} is not a multiple of 3 and cannot form whole triangles")]
    IndexCountMismatch(usize),

    /// A triangle refers to a vertex that does not exist.
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u32,
        /// Position of the index in the index buffer.
        position: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Build configuration rejected by validation.
    #[error("invalid build config: {0}")]
    InvalidConfig(String),
}

/// Result type for acceleration-structure operations.
pub type Result<T> = std::result::Result<T, AccelError>;
