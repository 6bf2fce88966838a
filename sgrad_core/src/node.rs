//! Core data structures for the computation graph.
//!
//! The graph is built from `Value` nodes, which are reference-counted handles
//! to internal `Node` structures. Cloning a handle is cheap and lets the same
//! node (typically a weight) feed many consumers. Identity, not value
//! equality, is what distinguishes two nodes.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ops;

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Unique identifier for a node in the computation graph.
///
/// IDs increase monotonically, so a node's ID is always greater than the IDs
/// of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

/// The operation that produced a node.
///
/// The tag selects the derivative rule during the backward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// An input or trainable parameter.
    Leaf,
    /// A raw number lifted into the graph.
    Const,
    /// operands[0] + operands[1]
    Add,
    /// operands[0] - operands[1]
    Sub,
    /// operands[0] * operands[1]
    Mul,
    /// operands[0] / operands[1]
    Div,
    /// -operands[0]
    Neg,
    /// operands[0]^exponent with a constant exponent
    Pow { exponent: f64 },
    /// ln(operands[0])
    Log,
    /// exp(operands[0])
    Exp,
    /// sin(operands[0])
    Sin,
    /// cos(operands[0])
    Cos,
    /// max(0, operands[0])
    Relu,
    /// 1 / (1 + exp(-operands[0]))
    Sigmoid,
    /// tanh(operands[0])
    Tanh,
}

impl Op {
    /// Short diagnostic label. Never used for dispatch.
    pub fn tag(&self) -> &'static str {
        match self {
            Op::Leaf => "",
            Op::Const => "const",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Neg => "neg",
            Op::Pow { .. } => "pow",
            Op::Log => "log",
            Op::Exp => "exp",
            Op::Sin => "sin",
            Op::Cos => "cos",
            Op::Relu => "relu",
            Op::Sigmoid => "sigmoid",
            Op::Tanh => "tanh",
        }
    }
}

/// Internal node structure.
///
/// `inputs` and `output` are frozen when the node is built. The derivative
/// rules read only these, so updating a parameter's `value` after a forward
/// pass cannot change the gradients that pass produces.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) op: Op,
    pub(crate) operands: Vec<Value>,
    /// Operand values at construction time, parallel to `operands`.
    pub(crate) inputs: Vec<f64>,
    /// This node's forward value at construction time.
    pub(crate) output: f64,
    pub(crate) value: Cell<f64>,
    pub(crate) grad: Cell<f64>,
    pub(crate) name: Option<String>,
}

impl Drop for Node {
    /// Free the operand chain with an explicit stack, never recursing per
    /// graph level. Operands still held elsewhere only lose one reference.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.operands);
        while let Some(Value(rc)) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(rc) {
                pending.append(&mut node.operands);
            }
        }
    }
}

/// A differentiable scalar.
///
/// `Value` is a reference-counted handle to a `Node`. Leaves (inputs and
/// parameters) are long-lived; every other node is owned only by the nodes
/// that consume it, so dropping the final result of a forward pass releases
/// that pass's whole graph.
#[derive(Clone)]
pub struct Value(pub(crate) Rc<Node>);

impl Value {
    /// Create a new leaf with the given value.
    pub fn leaf(value: f64) -> Self {
        Value::build(Op::Leaf, Vec::new(), value, None)
    }

    /// Create a new leaf carrying a diagnostic name.
    pub fn named(name: impl Into<String>, value: f64) -> Self {
        Value::build(Op::Leaf, Vec::new(), value, Some(name.into()))
    }

    /// Lift a raw number into the graph.
    pub fn constant(value: f64) -> Self {
        Value::build(Op::Const, Vec::new(), value, None)
    }

    /// Create a node for `op` over `operands`, evaluating it immediately.
    ///
    /// Callers are responsible for domain checks; see `Value::log`.
    pub(crate) fn from_op(op: Op, operands: Vec<Value>) -> Self {
        let inputs: Vec<f64> = operands.iter().map(Value::value).collect();
        let output = ops::forward(op, &inputs);
        Value::build_with_inputs(op, operands, inputs, output, None)
    }

    fn build(op: Op, operands: Vec<Value>, value: f64, name: Option<String>) -> Self {
        Value::build_with_inputs(op, operands, Vec::new(), value, name)
    }

    fn build_with_inputs(
        op: Op,
        operands: Vec<Value>,
        inputs: Vec<f64>,
        output: f64,
        name: Option<String>,
    ) -> Self {
        Value(Rc::new(Node {
            id: NodeId(next_node_id()),
            op,
            operands,
            inputs,
            output,
            value: Cell::new(output),
            grad: Cell::new(0.0),
            name,
        }))
    }

    /// Unique identity of the underlying node, shared by all clones of this handle.
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// The operation that produced this node.
    pub fn op(&self) -> Op {
        self.0.op
    }

    /// The nodes this one was computed from, in operand order.
    pub fn operands(&self) -> &[Value] {
        &self.0.operands
    }

    /// Diagnostic name given with [`Value::named`], if any.
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// A node with no operands: an input, a parameter, or a constant.
    pub fn is_leaf(&self) -> bool {
        self.0.operands.is_empty()
    }

    /// Whether this node is a lifted raw number rather than an input or parameter.
    pub fn is_constant(&self) -> bool {
        matches!(self.0.op, Op::Const)
    }

    /// Current value. For computed nodes this is the forward result.
    pub fn value(&self) -> f64 {
        self.0.value.get()
    }

    /// Overwrite the value in place.
    ///
    /// Intended for leaves (parameter updates). Nodes already built from this
    /// one keep the value they saw at construction.
    pub fn set_value(&self, value: f64) {
        self.0.value.set(value);
    }

    /// Accumulated d(root)/d(self) from the backward passes run so far.
    pub fn grad(&self) -> f64 {
        self.0.grad.get()
    }

    /// Overwrite the gradient.
    pub fn set_grad(&self, grad: f64) {
        self.0.grad.set(grad);
    }

    /// Reset the gradient to zero.
    pub fn zero_grad(&self) {
        self.0.grad.set(0.0);
    }

    pub(crate) fn accumulate_grad(&self, contribution: f64) {
        self.0.grad.set(self.0.grad.get() + contribution);
    }

    /// Compute gradients of `self` with respect to every node it depends on.
    ///
    /// See [`crate::backward::backward`] for the accumulation rules.
    pub fn backward(&self) {
        crate::backward::backward(self);
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::constant(value)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Value");
        s.field("id", &self.0.id.0);
        if let Some(name) = &self.0.name {
            s.field("name", name);
        }
        s.field("op", &self.0.op.tag())
            .field("value", &self.value())
            .field("grad", &self.grad())
            .field(
                "operands",
                &self.0.operands.iter().map(|o| o.0.id.0).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(data={}, grad={})", self.value(), self.grad())
    }
}
