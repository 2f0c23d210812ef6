use std::collections::{HashSet, VecDeque};

use generational_arena::Arena;
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::{EventId, Gate, GateId, PrimaryEvent};

/// Arena-backed fault tree: one root gate plus every gate and event reachable from it.
///
/// Gates and events live in separate generational arenas and reference each other
/// through [`GateId`] / [`EventId`] handles, so a reused event is shared by all of
/// its parents instead of being cloned. Nodes are never removed.
#[derive(Debug)]
pub struct FaultTree {
    gates: Arena<Gate>,
    events: Arena<PrimaryEvent>,
    root: GateId,
    /// Events in creation order
    event_order: Vec<EventId>,
}

impl FaultTree {
    /// Create a tree holding only `root`.
    pub fn new(root: Gate) -> Self {
        let mut gates = Arena::new();
        let root = GateId(gates.insert(root));
        Self {
            gates,
            events: Arena::new(),
            root,
            event_order: Vec::new(),
        }
    }

    pub fn root(&self) -> GateId {
        self.root
    }

    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id.0]
    }

    pub fn event(&self, id: EventId) -> &PrimaryEvent {
        &self.events[id.0]
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    /// Event handles in creation order.
    pub fn event_ids(&self) -> &[EventId] {
        &self.event_order
    }

    /// Events in creation order.
    pub fn events(&self) -> impl Iterator<Item = (EventId, &PrimaryEvent)> + '_ {
        self.event_order.iter().map(move |&id| (id, self.event(id)))
    }

    /// All gates in arena order (root first).
    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> + '_ {
        self.gates.iter().map(|(idx, gate)| (GateId(idx), gate))
    }

    /// Insert `child` as a new gate below `parent`.
    ///
    /// The child inherits the parent's ancestors plus the parent itself.
    #[instrument(level = "trace", skip(self, child), fields(child = %child.name))]
    pub fn add_gate_child(&mut self, parent: GateId, mut child: Gate) -> GateId {
        child.ancestors = self.gate(parent).ancestors.clone();
        child.ancestors.insert(parent);
        child.parents.push(parent);

        let id = GateId(self.gates.insert(child));
        self.gates[parent.0].gate_children.push(id);
        id
    }

    /// Insert `event` as a new primary event below `parent`.
    #[instrument(level = "trace", skip(self, event), fields(event = %event.name))]
    pub fn add_event_child(&mut self, parent: GateId, event: PrimaryEvent) -> EventId {
        let id = EventId(self.events.insert(event));
        self.event_order.push(id);
        self.attach_event(parent, id);
        id
    }

    /// Reference an existing event from `parent`.
    ///
    /// Returns `false` when the event already is a child of `parent`, in which case
    /// nothing changes.
    #[instrument(level = "trace", skip(self))]
    pub fn attach_event(&mut self, parent: GateId, event: EventId) -> bool {
        let gate = &mut self.gates[parent.0];
        if gate.primary_children.contains(&event) {
            return false;
        }
        gate.primary_children.push(event);
        self.events[event.0].parents.push(parent);
        true
    }

    /// Iterate gates breadth-first from the root, each gate exactly once.
    pub fn iter_breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(self)
    }

    /// Render the structure for terminal display.
    ///
    /// Shared events are shown below every parent.
    #[instrument(level = "debug", skip(self))]
    pub fn to_display_tree(&self) -> Tree<String> {
        fn build(tree: &FaultTree, id: GateId) -> Tree<String> {
            let gate = tree.gate(id);
            let mut node = Tree::new(format!("{} ({})", gate.name, gate.kind));
            for &event_id in &gate.primary_children {
                let event = tree.event(event_id);
                node.push(Tree::new(format!("{} p={}", event.name, event.probability)));
            }
            for &child in &gate.gate_children {
                node.push(build(tree, child));
            }
            node
        }

        build(self, self.root)
    }
}

/// Breadth-first gate iterator; gates reachable through several parents are
/// yielded once.
pub struct BreadthFirst<'a> {
    tree: &'a FaultTree,
    queue: VecDeque<GateId>,
    seen: HashSet<GateId>,
}

impl<'a> BreadthFirst<'a> {
    fn new(tree: &'a FaultTree) -> Self {
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        queue.push_back(tree.root());
        seen.insert(tree.root());
        Self { tree, queue, seen }
    }
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (GateId, &'a Gate);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        let gate = self.tree.gate(current);
        for &child in &gate.gate_children {
            if self.seen.insert(child) {
                self.queue.push_back(child);
            }
        }
        Some((current, gate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GateKind;

    fn small_tree() -> (FaultTree, GateId, EventId) {
        let mut tree = FaultTree::new(Gate::new("root", GateKind::Or));
        let root = tree.root();
        let g1 = tree.add_gate_child(root, Gate::new("G1", GateKind::And));
        let e1 = tree.add_event_child(root, PrimaryEvent::new("E1", 0.01));
        tree.add_event_child(g1, PrimaryEvent::new("E2", 0.02));
        tree.attach_event(g1, e1);
        (tree, g1, e1)
    }

    #[test]
    fn given_child_gate_when_added_then_links_parent_and_ancestors() {
        let (tree, g1, _) = small_tree();

        let child = tree.gate(g1);
        assert_eq!(child.parents, vec![tree.root()]);
        assert!(child.ancestors.contains(&tree.root()));
        assert!(!child.ancestors.contains(&g1));
        assert_eq!(tree.gate(tree.root()).gate_children, vec![g1]);
    }

    #[test]
    fn given_shared_event_then_has_both_parents() {
        let (tree, g1, e1) = small_tree();

        let event = tree.event(e1);
        assert_eq!(event.parents, vec![tree.root(), g1]);
        assert_eq!(tree.num_events(), 2);
    }

    #[test]
    fn given_event_already_attached_when_attaching_again_then_is_noop() {
        let (mut tree, g1, e1) = small_tree();

        assert!(!tree.attach_event(g1, e1));
        assert_eq!(tree.gate(g1).primary_children.len(), 2);
        assert_eq!(tree.event(e1).parents.len(), 2);
    }

    #[test]
    fn given_tree_when_iterating_breadth_first_then_root_comes_first() {
        let (mut tree, g1, _) = small_tree();
        let g2 = tree.add_gate_child(g1, Gate::new("G2", GateKind::Or));

        let order: Vec<GateId> = tree.iter_breadth_first().map(|(id, _)| id).collect();
        assert_eq!(order, vec![tree.root(), g1, g2]);
    }

    #[test]
    fn given_tree_when_rendering_display_tree_then_lists_all_nodes() {
        let (tree, _, _) = small_tree();

        let rendered = tree.to_display_tree().to_string();
        assert!(rendered.starts_with("root (or)"));
        assert!(rendered.contains("G1 (and)"));
        assert_eq!(rendered.matches("E1 p=").count(), 2);
        assert!(rendered.contains("E2 p=0.02"));
    }
}
