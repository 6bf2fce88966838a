//! Reverse-mode automatic differentiation.
//!
//! The backward pass computes gradients by:
//! 1. Building a topological ordering of nodes reachable from the output
//! 2. Traversing in reverse order, pushing each node's gradient into its operands

use std::collections::HashSet;

use log::debug;

use crate::node::{NodeId, Value};
use crate::ops::local_gradients;

/// Run the chain rule from `root` over every node it depends on.
///
/// `root.grad` is seeded to 1.0. Interior nodes visited by this pass start
/// from zero, so their gradients reflect this pass only. Leaves accumulate
/// with `+=`: running the pass twice without zeroing the leaves doubles every
/// leaf gradient, and zeroing is the caller's job.
pub fn backward(root: &Value) {
    let order = topological_order(root);

    for node in &order {
        if !node.is_leaf() {
            node.zero_grad();
        }
    }
    root.set_grad(1.0);

    // Reverse topological order: every consumer is processed before its operands,
    // so a node's gradient is complete by the time it is read.
    for node in order.iter().rev() {
        if node.is_leaf() {
            continue;
        }
        let upstream = node.grad();
        if upstream == 0.0 {
            continue;
        }

        let local = local_gradients(node.op(), &node.0.inputs, node.0.output);
        for (operand, d) in node.operands().iter().zip(local) {
            operand.accumulate_grad(upstream * d);
        }
    }

    debug!("backward visited {} nodes from node {:?}", order.len(), root.id());
}

/// Order every node reachable from `root` so that each node comes after all of
/// its operands. `root` is last.
///
/// Uses DFS postorder with a visited set keyed by node identity, so a node
/// shared by many consumers appears exactly once. The traversal keeps its own
/// stack of `(node, next operand index)`, so graph depth is bounded by heap
/// memory rather than the thread stack.
pub fn topological_order(root: &Value) -> Vec<Value> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<(Value, usize)> = vec![(root.clone(), 0)];
    visited.insert(root.id());

    while let Some((node, next)) = stack.last_mut() {
        match node.operands().get(*next).cloned() {
            // Visit operands first (postorder)
            Some(operand) => {
                *next += 1;
                if visited.insert(operand.id()) {
                    stack.push((operand, 0));
                }
            }
            None => {
                if let Some((done, _)) = stack.pop() {
                    order.push(done);
                }
            }
        }
    }

    order
}
