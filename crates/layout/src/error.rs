//! Errors surfaced by the fallible (`try_*`) queries.

use core::fmt::{self, Display, Formatter};
use inline_layout_box_tree::NodeKey;

/// Why a layout query or pass could not produce a real answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineLayoutError {
    /// A geometry query ran before any layout produced a line.
    NotLaidOut,
    /// The measurement collaborator failed for one item; it was laid out with
    /// zero width.
    UnresolvedMeasurement { node: NodeKey, reason: String },
    /// The node is not part of this formatting context's inline subtree.
    UnmappedNode(NodeKey),
    /// The request uses a phase or action this formatting context does not handle.
    InvalidState(String),
}

impl Display for LineLayoutError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLaidOut => write!(formatter, "formatting context has no laid out lines"),
            Self::UnresolvedMeasurement { node, reason } => {
                write!(formatter, "could not measure text of {node:?}: {reason}")
            }
            Self::UnmappedNode(node) => {
                write!(formatter, "{node:?} is not in this formatting context")
            }
            Self::InvalidState(message) => write!(formatter, "invalid request: {message}"),
        }
    }
}

impl std::error::Error for LineLayoutError {}
