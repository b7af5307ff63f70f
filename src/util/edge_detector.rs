// Detects when a signal transitions into its target value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeDetector<V> {
    target_value: V,

    previous_value: V,
    value: V,
}

impl <V: PartialEq + Eq + Clone + Copy> EdgeDetector<V> {
    pub const fn new(target_value: V, initial_value: V) -> Self {
        Self {
            target_value,

            previous_value: initial_value,
            value: initial_value,
        }
    }

    pub fn matches_target(&self, value: V) -> bool {
        value == self.target_value
    }

    pub fn set_value_then_detect(&mut self, value: V) -> bool {
        self.value = value;
        let edge_detected = self.value == self.target_value && self.previous_value != self.value;
        self.previous_value = self.value;
        edge_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_only_the_transition_into_the_target() {
        let mut detector = EdgeDetector::new(true, false);
        assert!(!detector.set_value_then_detect(false));
        assert!(detector.set_value_then_detect(true));
        assert!(!detector.set_value_then_detect(true));
        assert!(!detector.set_value_then_detect(false));
        assert!(detector.set_value_then_detect(true));
    }
}
