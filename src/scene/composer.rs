//! Walks the scene tree into a flat list of draw commands.

use glam::{Mat4, Vec3};

use crate::camera::CameraState;
use crate::interaction::InteractionDetector;
use crate::layout::ChairId;
use crate::mesh::Primitive;
use crate::scene::graph::{Material, Node, Op};
use crate::scene::state::SceneState;
use crate::transform_stack::TransformStack;

/// One primitive to draw, fully resolved to world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    pub material: Material,
    pub model: Mat4,
    /// Inverse-transpose of `model`, for transforming normals.
    pub normal: Mat4,
}

/// Draw commands for one frame, in submission order.
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }

    pub fn as_slice(&self) -> &[DrawCommand] {
        &self.commands
    }
}

/// What a traversal found besides draw commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Traversal {
    /// The chair the camera is aimed at, if any.
    pub targeted: Option<ChairId>,
    /// True when some chair is targetable (drives the HUD prompt).
    pub in_range: bool,
}

/// Interprets a [`Node`] tree with a transform stack.
///
/// Translucent leaves are not sorted; they blend correctly only if the tree lists
/// them after everything they cover.
#[derive(Debug, Default)]
pub struct Composer {
    stack: TransformStack,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the draws for `root` to `queue` and reports which chair the camera
    /// is aimed at.
    ///
    /// # Panics
    ///
    /// If the transform stack is not back at its starting depth afterwards.
    pub fn compose(
        &mut self,
        root: &Node,
        state: &SceneState,
        camera: &CameraState,
        queue: &mut DrawQueue,
    ) -> Traversal {
        let depth = self.stack.depth();
        self.stack.set(Mat4::IDENTITY);
        let mut detector = InteractionDetector::new(camera.position, camera.yaw);
        let queued = queue.len();

        visit(&mut self.stack, root, state, &mut detector, queue);

        assert_eq!(
            self.stack.depth(),
            depth,
            "unbalanced scene traversal: stack depth {} after, {depth} before",
            self.stack.depth()
        );
        log::trace!("composed {} draws", queue.len() - queued);

        Traversal {
            targeted: detector.targeted(),
            in_range: detector.in_range(),
        }
    }
}

fn apply(stack: &mut TransformStack, op: &Op, state: &SceneState) {
    match *op {
        Op::Translate(offset) => stack.translate(offset),
        Op::Rotate { degrees, axis } => stack.rotate_deg(degrees, axis),
        Op::Scale(factors) => stack.scale(factors),
        Op::Animated(binding) => stack.multiply(binding.matrix(state)),
    }
}

fn visit(
    stack: &mut TransformStack,
    node: &Node,
    state: &SceneState,
    detector: &mut InteractionDetector,
    queue: &mut DrawQueue,
) {
    match node {
        Node::Group { ops, children, .. } => {
            let mut scope = stack.scope();
            for op in ops {
                apply(&mut scope, op, state);
            }
            for child in children {
                visit(&mut scope, child, state, detector, queue);
            }
        }
        Node::Probe(chair) => {
            let floor_point = stack.current().transform_point3(Vec3::ZERO);
            detector.consider(*chair, floor_point);
        }
        Node::Cube(material) => push_draw(stack, queue, Primitive::Cube, *material),
        Node::Plane(material) => push_draw(stack, queue, Primitive::Plane, *material),
    }
}

fn push_draw(
    stack: &TransformStack,
    queue: &mut DrawQueue,
    primitive: Primitive,
    material: Material,
) {
    let model = stack.current();
    queue.push(DrawCommand {
        primitive,
        material,
        model,
        normal: model.inverse().transpose(),
    });
}
