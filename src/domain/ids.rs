//! Sequential node names for one generation run.

/// Issues `G<n>` gate names and `E<n>` event names.
///
/// Gate numbering starts at `G0`, which the root consumes before its name is
/// replaced by the configured root name. Event numbering starts at `E1`.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    gates: usize,
    events: usize,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_gate(&mut self) -> String {
        let name = format!("G{}", self.gates);
        self.gates += 1;
        name
    }

    pub fn next_event(&mut self) -> String {
        self.events += 1;
        format!("E{}", self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fresh_allocator_then_names_start_at_g0_and_e1() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_gate(), "G0");
        assert_eq!(ids.next_gate(), "G1");
        assert_eq!(ids.next_event(), "E1");
        assert_eq!(ids.next_event(), "E2");
    }

    #[test]
    fn given_two_allocators_then_counters_are_independent() {
        let mut first = IdAllocator::new();
        first.next_gate();
        first.next_event();

        let mut second = IdAllocator::new();
        assert_eq!(second.next_gate(), "G0");
        assert_eq!(second.next_event(), "E1");
    }
}
