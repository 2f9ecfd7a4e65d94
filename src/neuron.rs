use std::fmt;

use serde::{Deserialize, Serialize};

/// Threshold assigned to dead neurons. Finite so comparisons stay well
/// defined, and far above any potential reachable within a horizon.
pub const DEAD_THRESHOLD: f64 = f64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SpikeOnce,
    Rand,
    DegreeReceiver,
    Selector,
    Counter,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SpikeOnce,
        Role::Rand,
        Role::DegreeReceiver,
        Role::Selector,
        Role::Counter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::SpikeOnce => "spike_once",
            Role::Rand => "rand",
            Role::DegreeReceiver => "degree_receiver",
            Role::Selector => "selector",
            Role::Counter => "counter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a neuron within an MDSA network.
///
/// `node` is the graph node owning the neuron. Degree receivers additionally
/// carry the `candidate` node they compete for; every role except the counter
/// belongs to an approximation `round`. Backups created by redundancy share the
/// identity of their primary with `backup` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId {
    pub role: Role,
    pub node: usize,
    pub candidate: Option<usize>,
    pub round: Option<usize>,
    pub backup: bool,
}

impl NeuronId {
    fn primary(role: Role, node: usize, candidate: Option<usize>, round: Option<usize>) -> Self {
        Self {
            role,
            node,
            candidate,
            round,
            backup: false,
        }
    }

    pub fn spike_once(node: usize, round: usize) -> Self {
        Self::primary(Role::SpikeOnce, node, None, Some(round))
    }

    pub fn rand(node: usize, round: usize) -> Self {
        Self::primary(Role::Rand, node, None, Some(round))
    }

    pub fn degree_receiver(node: usize, candidate: usize, round: usize) -> Self {
        Self::primary(Role::DegreeReceiver, node, Some(candidate), Some(round))
    }

    pub fn selector(node: usize, round: usize) -> Self {
        Self::primary(Role::Selector, node, None, Some(round))
    }

    pub fn counter(node: usize) -> Self {
        Self::primary(Role::Counter, node, None, None)
    }

    pub fn to_backup(self) -> Self {
        Self {
            backup: true,
            ..self
        }
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.backup {
            f.write_str("r_")?;
        }
        write!(f, "{}_{}", self.role, self.node)?;
        if let Some(candidate) = self.candidate {
            write!(f, "_{}", candidate)?;
        }
        if let Some(round) = self.round {
            write!(f, "_{}", round)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifParams {
    pub bias: f64,
    pub du: f64,
    pub dv: f64,
    pub threshold: f64,
}

impl LifParams {
    pub const fn new(bias: f64, du: f64, dv: f64, threshold: f64) -> Self {
        Self {
            bias,
            du,
            dv,
            threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    pub bias: f64,
    pub du: f64,
    pub dv: f64,
    pub threshold: f64,
    pub u: f64,
    pub v: f64,
    pub has_fired: bool,
    pub is_dead: bool,
}

impl Neuron {
    pub fn new(id: NeuronId, params: LifParams) -> Self {
        Self {
            id,
            bias: params.bias,
            du: params.du,
            dv: params.dv,
            threshold: params.threshold,
            u: 0.0,
            v: 0.0,
            has_fired: false,
            is_dead: false,
        }
    }

    pub fn role(&self) -> Role {
        self.id.role
    }

    pub fn params(&self) -> LifParams {
        LifParams::new(self.bias, self.du, self.dv, self.threshold)
    }

    /// Advances the neuron by one timestep given the summed weight of all
    /// synapses whose source fired in the previous step. Returns whether the
    /// neuron fires in this step.
    pub fn update(&mut self, a_in: f64) -> bool {
        self.u = self.u * (1.0 - self.du) + a_in;
        self.v = self.v * (1.0 - self.dv) + self.u + self.bias;

        let fires = self.v >= self.threshold && !self.is_dead;
        if fires {
            self.v -= self.threshold;
        }

        self.has_fired = fires;
        fires
    }

    /// Disables the neuron permanently. Returns `false` if it was already dead.
    pub fn kill(&mut self) -> bool {
        if self.is_dead {
            return false;
        }

        self.is_dead = true;
        self.threshold = DEAD_THRESHOLD;
        true
    }

    pub fn has_valid_params(&self) -> bool {
        self.bias.is_finite()
            && self.du.is_finite()
            && self.dv.is_finite()
            && self.threshold.is_finite()
            && (0.0..=1.0).contains(&self.du)
            && (0.0..=1.0).contains(&self.dv)
    }
}
