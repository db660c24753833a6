//! The classroom scene: its tree, its mutable state, and the traversal that turns
//! both into draw commands.
//!
//! - [`graph`]: the declarative [`Node`] tree and animated [`Binding`]s
//! - [`classroom`]: builds the room once at startup
//! - [`state`]: every value the tree's bindings read
//! - [`composer`]: walks the tree with a transform stack

pub mod classroom;
pub mod composer;
pub mod graph;
pub mod state;

pub use composer::{Composer, DrawCommand, DrawQueue, Traversal};
pub use graph::{Binding, Material, Node, Op};
pub use state::SceneState;
