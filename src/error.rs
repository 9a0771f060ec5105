//! Error types.
//!
//! Only resource creation and mesh validation are fallible. Lifecycle
//! misuse (drawing before initialization, deleting a handle twice) is a
//! programming error and panics instead of returning one of these.

use thiserror::Error;

/// Failure reported by a graphics context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlError {
    /// A display list or buffer object could not be generated.
    #[error("Failed to create {kind}: {reason}")]
    ResourceCreation {
        /// What was being created (`"display list"`, `"buffer"`, ...).
        kind: &'static str,
        /// Driver-supplied reason.
        reason: String,
    },
    /// A shader stage failed to compile.
    #[error("Shader compile error: {0}")]
    ShaderCompile(String),
    /// The shader program failed to link.
    #[error("Program link error: {0}")]
    ProgramLink(String),
}

impl GlError {
    /// Shorthand for [`GlError::ResourceCreation`].
    pub fn creation(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::ResourceCreation {
            kind,
            reason: reason.into(),
        }
    }
}

/// A vertex dataset that cannot be drawn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A float array is not a whole number of `(x, y, z)` triples.
    #[error("{name} has {len} floats, which is not a multiple of 3")]
    BadStride {
        /// Which array was malformed.
        name: &'static str,
        /// Its length in floats.
        len: usize,
    },
    /// An index points past the end of the unique-vertex pool.
    #[error("index {index} at position {position} exceeds {unique} unique vertices")]
    IndexOutOfRange {
        /// The offending index value.
        index: u16,
        /// Where in the index array it occurs.
        position: usize,
        /// Size of the unique-vertex pool.
        unique: usize,
    },
    /// The index array does not describe one index per flat vertex.
    #[error("{indices} indices for {vertices} vertices; the counts must match")]
    IndexCountMismatch {
        /// Length of the index array.
        indices: usize,
        /// Vertices in the flat array.
        vertices: usize,
    },
    /// Deduplication produced more vertices than a `u16` index can address.
    #[error("{0} unique vertices cannot be addressed with 16-bit indices")]
    TooManyVertices(usize),
}
