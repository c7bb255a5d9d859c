//! Configuration for the layout engine

/// Objective weights for layout computation.
///
/// Both weights default to 1. The gap weight penalizes unused virtual
/// space between related displays; the alignment weight penalizes the
/// distance between the centers of related displays measured across the
/// axis they are ordered along. Raising one relative to the other trades
/// packing tightness against visual alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Weight of the edge-to-edge gap along the ordering axis
    pub gap_weight: u32,

    /// Weight of the center distance across the ordering axis
    pub alignment_weight: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap_weight: 1,
            alignment_weight: 1,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap weight
    pub fn with_gap_weight(mut self, weight: u32) -> Self {
        self.gap_weight = weight;
        self
    }

    /// Set the alignment weight
    pub fn with_alignment_weight(mut self, weight: u32) -> Self {
        self.alignment_weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.gap_weight, 1);
        assert_eq!(config.alignment_weight, 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_gap_weight(3)
            .with_alignment_weight(0);
        assert_eq!(config.gap_weight, 3);
        assert_eq!(config.alignment_weight, 0);
    }
}
