//! Domain entities: gates, primary events and their handles

use std::collections::HashSet;
use std::fmt;

use generational_arena::Index;
use rand::distributions::{Distribution, Standard};
use rand::Rng;

/// Handle of a gate stored in a [`FaultTree`](crate::domain::FaultTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateId(pub(crate) Index);

/// Handle of a primary event stored in a [`FaultTree`](crate::domain::FaultTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub(crate) Index);

/// Boolean combination applied by a gate to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Or,
    And,
}

impl GateKind {
    /// Element name used in the MEF document.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateKind::Or => "or",
            GateKind::And => "and",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform choice between OR and AND.
impl Distribution<GateKind> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GateKind {
        if rng.gen::<bool>() {
            GateKind::And
        } else {
            GateKind::Or
        }
    }
}

/// Intermediate or root logic element.
#[derive(Debug, Clone)]
pub struct Gate {
    pub name: String,
    pub kind: GateKind,
    /// Gates this gate is a child of (empty for the root)
    pub parents: Vec<GateId>,
    /// Primary event children, insertion ordered, no duplicates
    pub primary_children: Vec<EventId>,
    /// Gate children, insertion ordered, no duplicates
    pub gate_children: Vec<GateId>,
    /// Every gate on every path back to the root, excluding this gate
    pub ancestors: HashSet<GateId>,
}

impl Gate {
    pub fn new(name: impl Into<String>, kind: GateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parents: Vec::new(),
            primary_children: Vec::new(),
            gate_children: Vec::new(),
            ancestors: HashSet::new(),
        }
    }

    /// Number of direct children, events and gates together.
    pub fn num_children(&self) -> usize {
        self.primary_children.len() + self.gate_children.len()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Leaf failure event with a fixed probability.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryEvent {
    pub name: String,
    pub probability: f64,
    /// Gates referencing this event; more than one once the event is reused
    pub parents: Vec<GateId>,
}

impl PrimaryEvent {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
            parents: Vec::new(),
        }
    }
}
