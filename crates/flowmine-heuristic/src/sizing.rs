//! Node sizing for frequent activities.

use flowmine_core::config::NodeConfig;
use serde::{Deserialize, Serialize};

/// Two-dimensional node size in renderer units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

/// Computes a node's box size from its identifier and appearance frequency.
pub trait NodeSizer {
    fn size(&self, id: &str, frequency: u64) -> NodeSize;
}

impl<F> NodeSizer for F
where
    F: Fn(&str, u64) -> NodeSize,
{
    fn size(&self, id: &str, frequency: u64) -> NodeSize {
        self(id, frequency)
    }
}

/// Grows nodes linearly with `frequency / max_frequency`.
///
/// The most frequent node is `1 + max_growth` times the base size; a node
/// that never appears keeps the base size.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyNodeSizer {
    config: NodeConfig,
    max_frequency: u64,
}

impl FrequencyNodeSizer {
    #[must_use]
    pub const fn new(config: NodeConfig, max_frequency: u64) -> Self {
        Self {
            config,
            max_frequency,
        }
    }
}

impl NodeSizer for FrequencyNodeSizer {
    #[allow(clippy::cast_precision_loss)]
    fn size(&self, _id: &str, frequency: u64) -> NodeSize {
        let ratio = if self.max_frequency == 0 {
            0.0
        } else {
            (frequency as f64 / self.max_frequency as f64).clamp(0.0, 1.0)
        };
        let factor = self.config.max_growth.mul_add(ratio, 1.0);
        NodeSize {
            width: self.config.base_width * factor,
            height: self.config.base_height * factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_frequent_node_is_largest() {
        let sizer = FrequencyNodeSizer::new(NodeConfig::default(), 20);
        let small = sizer.size("A", 5);
        let large = sizer.size("B", 20);
        assert!(large.width > small.width);
        assert!(large.height > small.height);
        assert!((large.width - 1.5 * 1.5).abs() < 1e-10);
    }

    #[test]
    fn zero_max_frequency_keeps_base_size() {
        let sizer = FrequencyNodeSizer::new(NodeConfig::default(), 0);
        let size = sizer.size("A", 0);
        assert!((size.width - 1.5).abs() < 1e-10);
        assert!((size.height - 0.6).abs() < 1e-10);
    }

    #[test]
    fn closures_are_sizers() {
        let fixed = |_: &str, _: u64| NodeSize {
            width: 2.0,
            height: 1.0,
        };
        assert_eq!(
            fixed.size("anything", 9),
            NodeSize {
                width: 2.0,
                height: 1.0
            }
        );
    }
}
