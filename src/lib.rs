pub mod adaptation;
pub mod builder;
pub mod error;
pub mod faults;
pub mod graph;
pub mod network;
pub mod neuron;
pub mod params;
pub mod reference;
pub mod run;
pub mod simulation;
pub mod state_snapshot;
pub mod stimulus;
pub mod sweep;
pub mod synapse;
pub mod validation;

mod types;
mod util;
