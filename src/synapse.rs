use serde::{Deserialize, Serialize};

/// Weights shared by the fixed parts of the circuit.
pub const SELF_INHIBITION_WEIGHT: f64 = -5.0;
pub const SELECTOR_INHIBITION_WEIGHT: f64 = -5.0;
pub const BACKUP_INHIBITION_WEIGHT: f64 = -5.0;
pub const UNIT_WEIGHT: f64 = 1.0;

/// Directed connection between two neurons of a network, by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    pub pre_syn_nid: usize,
    pub post_syn_nid: usize,
    pub weight: f64,
}

impl Synapse {
    pub fn new(pre_syn_nid: usize, post_syn_nid: usize, weight: f64) -> Self {
        Self {
            pre_syn_nid,
            post_syn_nid,
            weight,
        }
    }

    pub fn is_self_synapse(&self) -> bool {
        self.pre_syn_nid == self.post_syn_nid
    }

    pub fn is_inhibitory(&self) -> bool {
        self.weight < 0.0
    }
}
