//! # Semantic Representation Model
//!
//! Clean DTOs describing one analyzed text: an ordered unit sequence and a
//! typed relation graph. These types cross every boundary:
//! analyzer ↔ pipeline ↔ draft generator ↔ payload.
//!
//! Design rule: NO lexicon state, NO guide bytecode here.
//! This module is pure data — no I/O, no shared state.

pub mod unit;
pub mod node;
pub mod relationship;
pub mod graph;
pub mod representation;
pub mod value;
pub mod property_map;

pub use unit::{SemanticUnit, UnitId, UnitType};
pub use node::{SemanticNode, SemanticNodeId};
pub use relationship::{RelationType, SemanticEdge};
pub use graph::SemanticGraph;
pub use representation::SemanticRepresentation;
pub use value::MetaValue;
pub use property_map::Metadata;
