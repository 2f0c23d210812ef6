//! Randomized fault tree construction.
//!
//! The builder grows a tree from the root gate in two phases:
//!
//! 1. The root receives `ptop` fresh primary events, then fresh gates until it
//!    reaches its target child count (`ctop`, or a sample raised to `ptop`).
//! 2. Pending gates are expanded breadth-first. Each step adds a gate or a
//!    primary event according to `ratio`, possibly reusing an existing event
//!    (`reuse_p`). Once `nprimary` events exist, only reuse is allowed. When the
//!    queue runs dry before `nprimary` events exist, one more gate is forced in.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument, trace};

use crate::domain::arena::FaultTree;
use crate::domain::entities::{EventId, Gate, GateId, PrimaryEvent};
use crate::domain::ids::IdAllocator;
use crate::domain::params::TreeShape;

/// Builds one fault tree. All run state (names, pending gates, RNG) lives here,
/// so independent builders never interfere.
pub struct TreeBuilder<R: Rng = StdRng> {
    shape: TreeShape,
    rng: R,
    ids: IdAllocator,
    pending: VecDeque<GateId>,
}

impl TreeBuilder<StdRng> {
    /// Builder seeded from `shape.seed`.
    pub fn new(shape: TreeShape) -> Self {
        let rng = StdRng::seed_from_u64(shape.seed);
        Self::with_rng(shape, rng)
    }
}

impl<R: Rng> TreeBuilder<R> {
    pub fn with_rng(shape: TreeShape, rng: R) -> Self {
        Self {
            shape,
            rng,
            ids: IdAllocator::new(),
            pending: VecDeque::new(),
        }
    }

    /// Consume the builder and produce the tree.
    #[instrument(level = "debug", skip(self), fields(root = %self.shape.root))]
    pub fn build(mut self) -> FaultTree {
        let mut tree = self.init_root();
        while let Some(gate) = self.pending.pop_front() {
            self.expand(&mut tree, gate);
        }
        debug!(
            gates = tree.num_gates(),
            events = tree.num_events(),
            "fault tree built"
        );
        tree
    }

    fn sample_child_count(&mut self) -> usize {
        self.rng
            .gen_range(self.shape.min_children..=self.shape.max_children)
    }

    fn init_root(&mut self) -> FaultTree {
        // The root consumes the first gate number even though it is renamed.
        self.ids.next_gate();
        let mut tree = FaultTree::new(Gate::new(self.shape.root.clone(), self.rng.gen()));
        let root = tree.root();

        let sampled = self.sample_child_count();
        // Without ctop the root keeps at least one gate after its ptop events
        // while events are still missing, otherwise nothing is left to expand.
        let target = match self.shape.ctop {
            Some(ctop) => ctop,
            None if self.shape.ptop < self.shape.nprimary => sampled.max(self.shape.ptop + 1),
            None => sampled.max(self.shape.ptop),
        };
        debug!(target, ptop = self.shape.ptop, "initializing root");

        for _ in 0..self.shape.ptop {
            self.create_event(&mut tree, root);
        }
        while tree.gate(root).num_children() < target {
            self.create_gate(&mut tree, root);
        }
        tree
    }

    #[instrument(level = "trace", skip(self, tree))]
    fn expand(&mut self, tree: &mut FaultTree, gate: GateId) {
        let target = self.sample_child_count();
        trace!(gate = %tree.gate(gate).name, target, "expanding gate");

        while tree.gate(gate).num_children() < target {
            if tree.num_events() >= self.shape.nprimary {
                if !self.reuse_event(tree, gate) {
                    trace!(gate = %tree.gate(gate).name, "every event already attached");
                    break;
                }
                continue;
            }

            if self.rng.gen::<f64>() < self.shape.gate_probability() {
                self.create_gate(tree, gate);
            } else if self.rng.gen::<f64>() < self.shape.reuse_p && tree.num_events() > 0 {
                let candidate = self.pick_event(tree);
                tree.attach_event(gate, candidate);
            } else {
                self.create_event(tree, gate);
            }

            if self.pending.is_empty() && tree.num_events() < self.shape.nprimary {
                trace!(gate = %tree.gate(gate).name, "queue drained early, forcing a gate");
                self.create_gate(tree, gate);
            }
        }
    }

    /// Attach a random existing event that is not yet a child of `gate`.
    ///
    /// Returns `false` when no such event exists.
    fn reuse_event(&mut self, tree: &mut FaultTree, gate: GateId) -> bool {
        let attached = &tree.gate(gate).primary_children;
        if tree.event_ids().iter().all(|id| attached.contains(id)) {
            return false;
        }
        loop {
            let candidate = self.pick_event(tree);
            if tree.attach_event(gate, candidate) {
                return true;
            }
        }
    }

    fn pick_event(&mut self, tree: &FaultTree) -> EventId {
        let ids = tree.event_ids();
        ids[self.rng.gen_range(0..ids.len())]
    }

    fn create_gate(&mut self, tree: &mut FaultTree, parent: GateId) -> GateId {
        let gate = Gate::new(self.ids.next_gate(), self.rng.gen());
        let id = tree.add_gate_child(parent, gate);
        self.pending.push_back(id);
        id
    }

    fn create_event(&mut self, tree: &mut FaultTree, parent: GateId) -> EventId {
        let probability = self
            .rng
            .gen_range(self.shape.minprob..=self.shape.maxprob);
        let event = PrimaryEvent::new(self.ids.next_event(), probability);
        tree.add_event_child(parent, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::params::TreeParams;

    fn shape(params: TreeParams) -> TreeShape {
        params.validate().expect("valid parameters")
    }

    #[test]
    fn given_same_seed_when_building_twice_then_structures_match() {
        let first = TreeBuilder::new(shape(TreeParams::default())).build();
        let second = TreeBuilder::new(shape(TreeParams::default())).build();

        let names = |tree: &FaultTree| {
            tree.iter_breadth_first()
                .map(|(_, g)| g.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        let probs = |tree: &FaultTree| {
            tree.events()
                .map(|(_, e)| e.probability)
                .collect::<Vec<_>>()
        };
        assert_eq!(probs(&first), probs(&second));
    }

    #[test]
    fn given_root_then_named_from_config_and_intermediate_gates_start_at_g1() {
        let tree = TreeBuilder::new(shape(TreeParams {
            root: "TOP".into(),
            ..TreeParams::default()
        }))
        .build();

        let root = tree.gate(tree.root());
        assert_eq!(root.name, "TOP");
        assert!(root.is_root());
        assert!(tree.gates().all(|(_, g)| g.name != "G0"));
        assert!(tree.gates().any(|(_, g)| g.name == "G1"));
    }

    #[test]
    fn given_ptop_above_sampled_children_then_root_still_gets_a_gate() {
        let tree = TreeBuilder::new(shape(TreeParams {
            ptop: 4,
            ..TreeParams::default()
        }))
        .build();

        let root = tree.gate(tree.root());
        assert_eq!(root.primary_children.len(), 4);
        assert!(!root.gate_children.is_empty());
        assert_eq!(tree.num_events(), 10);
    }

    #[test]
    fn given_ctop_equal_ptop_then_root_holds_only_events() {
        let tree = TreeBuilder::new(shape(TreeParams {
            ptop: 4,
            ctop: 4,
            ..TreeParams::default()
        }))
        .build();

        let root = tree.gate(tree.root());
        assert_eq!(root.primary_children.len(), 4);
        assert!(root.gate_children.is_empty());
        assert_eq!(tree.num_gates(), 1);
        assert_eq!(tree.num_events(), 4);
    }

    #[test]
    fn given_nprimary_two_then_every_gate_still_has_two_children() {
        let tree = TreeBuilder::new(shape(TreeParams {
            nprimary: 2,
            nchildren: 6,
            ratio: 0.5,
            ..TreeParams::default()
        }))
        .build();

        assert_eq!(tree.num_events(), 2);
        assert!(tree.gates().all(|(_, g)| g.num_children() >= 2));
    }

    #[test]
    fn given_high_reuse_then_some_event_has_several_parents() {
        let tree = TreeBuilder::new(shape(TreeParams {
            nprimary: 200,
            nchildren: 4,
            reuse_p: 0.9,
            ..TreeParams::default()
        }))
        .build();

        assert!(tree.events().any(|(_, e)| e.parents.len() > 1));
    }

    #[test]
    fn given_custom_rng_when_building_then_uses_it() {
        let params = shape(TreeParams::default());
        let rng = StdRng::seed_from_u64(params.seed);
        let from_rng = TreeBuilder::with_rng(params.clone(), rng).build();
        let from_seed = TreeBuilder::new(params).build();

        assert_eq!(from_rng.num_gates(), from_seed.num_gates());
        assert_eq!(from_rng.num_events(), from_seed.num_events());
    }
}
