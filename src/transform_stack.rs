//! Save/restore stack of model matrices.
//!
//! Every transform post-multiplies the current matrix, so operations compose in
//! the local space of whatever was applied before them. Object routines save the
//! matrix before composing their parts and restore it afterwards; [`MatrixScope`]
//! does both automatically.

use glam::{Mat4, Vec3};
use std::ops::{Deref, DerefMut};

/// Maximum number of saved matrices. The classroom tree nests at most 5 deep.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::with_capacity(MAX_DEPTH),
        }
    }

    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Replaces the current matrix without touching the saved ones.
    pub fn set(&mut self, matrix: Mat4) {
        self.current = matrix;
    }

    /// Number of saved matrices.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Saves a copy of the current matrix.
    ///
    /// # Panics
    ///
    /// If [`MAX_DEPTH`] matrices are already saved.
    pub fn push(&mut self) {
        assert!(
            self.saved.len() < MAX_DEPTH,
            "transform stack overflow ({MAX_DEPTH} matrices saved)"
        );
        self.saved.push(self.current);
    }

    /// Restores the most recently saved matrix and returns it.
    ///
    /// # Panics
    ///
    /// If nothing has been saved.
    pub fn pop(&mut self) -> Mat4 {
        let Some(matrix) = self.saved.pop() else {
            panic!("transform stack underflow: pop with nothing saved");
        };
        self.current = matrix;
        matrix
    }

    pub fn multiply(&mut self, matrix: Mat4) {
        self.current *= matrix;
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.multiply(Mat4::from_translation(offset));
    }

    /// Rotates by `degrees` around `axis`. A zero axis is ignored.
    pub fn rotate_deg(&mut self, degrees: f32, axis: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.multiply(Mat4::from_axis_angle(axis, degrees.to_radians()));
    }

    pub fn scale(&mut self, factors: Vec3) {
        self.multiply(Mat4::from_scale(factors));
    }

    /// Saves the current matrix; it is restored when the returned guard drops.
    pub fn scope(&mut self) -> MatrixScope<'_> {
        self.push();
        MatrixScope { stack: self }
    }
}

/// Restores the matrix saved by [`TransformStack::scope`] on drop.
pub struct MatrixScope<'a> {
    stack: &'a mut TransformStack,
}

impl Deref for MatrixScope<'_> {
    type Target = TransformStack;

    fn deref(&self) -> &TransformStack {
        self.stack
    }
}

impl DerefMut for MatrixScope<'_> {
    fn deref_mut(&mut self) -> &mut TransformStack {
        self.stack
    }
}

impl Drop for MatrixScope<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn push_pop_restores_current() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::new(1.0, 2.0, 3.0));
        let before = stack.current();
        stack.push();
        stack.scale(Vec3::splat(4.0));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop(), before);
        assert_eq!(stack.current(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn pop_on_empty_stack_panics() {
        TransformStack::new().pop();
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn push_beyond_capacity_panics() {
        let mut stack = TransformStack::new();
        for _ in 0..=MAX_DEPTH {
            stack.push();
        }
    }

    #[test]
    fn operations_compose_in_local_space() {
        let mut stack = TransformStack::new();
        stack.translate(Vec3::new(10.0, 0.0, 0.0));
        stack.rotate_deg(90.0, Vec3::Y);
        stack.translate(Vec3::new(1.0, 0.0, 0.0));
        let p = stack.current().transform_point3(Vec3::ZERO);
        // local +x after a 90° turn about Y points along world -z
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn scope_pops_on_drop() {
        let mut stack = TransformStack::new();
        {
            let mut scope = stack.scope();
            scope.translate(Vec3::X);
            assert_eq!(scope.depth(), 1);
        }
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), Mat4::IDENTITY);
    }

    #[test]
    fn zero_axis_rotation_is_ignored() {
        let mut stack = TransformStack::new();
        stack.rotate_deg(45.0, Vec3::ZERO);
        assert_eq!(stack.current(), Mat4::IDENTITY);
    }

    #[derive(Clone, Debug)]
    enum StackOp {
        Translate(f32, f32, f32),
        Rotate(f32),
        Scale(f32),
        Nested(Vec<StackOp>),
    }

    fn stack_op() -> impl Strategy<Value = StackOp> {
        let leaf = prop_oneof![
            (-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0).prop_map(|(x, y, z)| StackOp::Translate(x, y, z)),
            (-360.0f32..360.0).prop_map(StackOp::Rotate),
            (0.1f32..4.0).prop_map(StackOp::Scale),
        ];
        leaf.prop_recursive(6, 48, 6, |inner| {
            prop::collection::vec(inner, 0..6).prop_map(StackOp::Nested)
        })
    }

    fn apply(stack: &mut TransformStack, op: &StackOp) {
        match op {
            StackOp::Translate(x, y, z) => stack.translate(Vec3::new(*x, *y, *z)),
            StackOp::Rotate(deg) => stack.rotate_deg(*deg, Vec3::Y),
            StackOp::Scale(s) => stack.scale(Vec3::splat(*s)),
            StackOp::Nested(ops) => {
                let mut scope = stack.scope();
                for op in ops {
                    apply(&mut scope, op);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn nested_scopes_leave_depth_and_matrix_unchanged(ops in prop::collection::vec(stack_op(), 0..8)) {
            let mut stack = TransformStack::new();
            stack.translate(Vec3::new(0.5, 0.0, 0.5));
            for op in &ops {
                let depth = stack.depth();
                let before = stack.current();
                if let StackOp::Nested(_) = op {
                    apply(&mut stack, op);
                    prop_assert_eq!(stack.current(), before);
                } else {
                    apply(&mut stack, op);
                }
                prop_assert_eq!(stack.depth(), depth);
            }
        }
    }
}
