//! Declarative scene tree.
//!
//! The classroom is described once as a tree of [`Node`]s. Group nodes carry a list
//! of transform [`Op`]s applied, in order, on top of the parent's matrix before
//! their children are visited. Most ops are constants; [`Op::Animated`] names a
//! [`Binding`] that is resolved against the live [`SceneState`] on every traversal.

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::layout::ChairId;
use crate::scene::state::SceneState;
use crate::texture::TextureSlot;

/// Surface appearance of a leaf: vertex color plus an optional texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<TextureSlot>,
}

impl Material {
    pub const fn flat(color: Color) -> Self {
        Self {
            color,
            texture: None,
        }
    }

    pub const fn textured(color: Color, texture: TextureSlot) -> Self {
        Self {
            color,
            texture: Some(texture),
        }
    }
}

/// A transform whose value depends on scene state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Binding {
    /// Slide a chair along `z` by its tuck offset.
    ChairTuck(ChairId),
    /// Swing the door leaf about `Y` by the door angle.
    DoorHinge,
    /// Move one board of a whiteboard pair. `sign` is `+1` for the front board and
    /// `-1` for the back one, so the two move in opposite directions.
    BoardSlide { board: usize, sign: f32 },
    /// Position and stretch a blind so it spans from its rail down to its bottom.
    BlindCover(usize),
}

/// Height of the blind rail's underside.
pub const BLIND_TOP: f32 = 2.15;
const BLIND_WIDTH: f32 = 2.5;

/// Board height in meters; boards travel in feet.
const BOARD_HEIGHT: f32 = 2.75 * 0.3;

impl Binding {
    pub fn matrix(&self, state: &SceneState) -> Mat4 {
        match *self {
            Binding::ChairTuck(chair) => {
                Mat4::from_translation(Vec3::new(0.0, 0.0, state.chair_offset(chair)))
            }
            Binding::DoorHinge => Mat4::from_rotation_y(state.door_angle().to_radians()),
            Binding::BoardSlide { board, sign } => {
                let rise = BOARD_HEIGHT / 2.0 - state.board_offset(board) * 0.3;
                Mat4::from_translation(Vec3::new(0.0, sign * rise, sign * 0.025))
            }
            Binding::BlindCover(blind) => {
                let bottom = state.lighting.blind_bottom(blind);
                Mat4::from_translation(Vec3::new(0.0, (BLIND_TOP + bottom) / 2.0, -0.04))
                    * Mat4::from_scale(Vec3::new(BLIND_WIDTH, BLIND_TOP - bottom, 0.01))
            }
        }
    }
}

/// One local transform step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Op {
    Translate(Vec3),
    Rotate { degrees: f32, axis: Vec3 },
    Scale(Vec3),
    Animated(Binding),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Group {
        label: &'static str,
        ops: Vec<Op>,
        children: Vec<Node>,
    },
    Cube(Material),
    Plane(Material),
    /// Marks a chair's floor point for the interaction detector. Draws nothing.
    Probe(ChairId),
}

impl Node {
    pub fn group(label: &'static str) -> Self {
        Node::Group {
            label,
            ops: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn cube(material: Material) -> Self {
        Node::Cube(material)
    }

    pub fn plane(material: Material) -> Self {
        Node::Plane(material)
    }

    fn op(mut self, op: Op) -> Self {
        if let Node::Group { ops, .. } = &mut self {
            ops.push(op);
        }
        self
    }

    pub fn translate(self, x: f32, y: f32, z: f32) -> Self {
        self.op(Op::Translate(Vec3::new(x, y, z)))
    }

    pub fn rotate(self, degrees: f32, axis: Vec3) -> Self {
        self.op(Op::Rotate { degrees, axis })
    }

    pub fn scale(self, x: f32, y: f32, z: f32) -> Self {
        self.op(Op::Scale(Vec3::new(x, y, z)))
    }

    pub fn animated(self, binding: Binding) -> Self {
        self.op(Op::Animated(binding))
    }

    /// Appends a child. Leaves ignore children.
    pub fn child(mut self, node: Node) -> Self {
        if let Node::Group { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Group { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Number of drawable leaves under (and including) this node.
    pub fn draw_count(&self) -> usize {
        match self {
            Node::Group { children, .. } => children.iter().map(Node::draw_count).sum(),
            Node::Cube(_) | Node::Plane(_) => 1,
            Node::Probe(_) => 0,
        }
    }

    /// Finds the first group with the given label, depth-first.
    pub fn find(&self, wanted: &str) -> Option<&Node> {
        match self {
            Node::Group { label, children, .. } => {
                if *label == wanted {
                    return Some(self);
                }
                children.iter().find_map(|child| child.find(wanted))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn builder_collects_ops_and_children() {
        let node = Node::group("box")
            .translate(1.0, 2.0, 3.0)
            .scale(0.5, 0.5, 0.5)
            .child(Node::cube(Material::flat(Color::WHITE)));
        let Node::Group { ops, children, .. } = &node else {
            panic!("expected a group");
        };
        assert_eq!(ops.len(), 2);
        assert_eq!(children.len(), 1);
        assert_eq!(node.draw_count(), 1);
    }

    #[test]
    fn leaves_ignore_builder_ops() {
        let leaf = Node::cube(Material::flat(Color::BLACK)).translate(1.0, 0.0, 0.0);
        assert_eq!(leaf, Node::cube(Material::flat(Color::BLACK)));
    }

    #[test]
    fn board_pair_moves_in_opposite_directions() {
        let mut state = SceneState::default();
        state.slide_board(2, 1.0);
        let front = Binding::BoardSlide { board: 2, sign: 1.0 }.matrix(&state);
        let back = Binding::BoardSlide { board: 2, sign: -1.0 }.matrix(&state);
        let front_y = front.transform_point3(Vec3::ZERO).y;
        let back_y = back.transform_point3(Vec3::ZERO).y;
        assert_relative_eq!(front_y, 0.4125 - 0.3, epsilon = 1e-5);
        assert_relative_eq!(back_y, -front_y, epsilon = 1e-5);
    }

    #[test]
    fn blind_cover_spans_rail_to_bottom() {
        let mut state = SceneState::default();
        state.lighting.adjust_blind(1, -1.0);
        let m = Binding::BlindCover(1).matrix(&state);
        let top = m.transform_point3(Vec3::new(0.0, 0.5, 0.0)).y;
        let bottom = m.transform_point3(Vec3::new(0.0, -0.5, 0.0)).y;
        assert_relative_eq!(top, BLIND_TOP, epsilon = 1e-5);
        assert_relative_eq!(bottom, state.lighting.blind_bottom(1), epsilon = 1e-5);
    }

    #[test]
    fn find_locates_nested_groups() {
        let tree = Node::group("root").child(Node::group("inner").child(Node::Probe(
            ChairId::new(0).unwrap(),
        )));
        assert!(tree.find("inner").is_some());
        assert!(tree.find("missing").is_none());
    }
}
