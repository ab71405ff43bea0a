//! Canvas force-directed graph of commanders linked by shared-deck weights.

mod camera;
mod component;
mod config;
mod forces;
mod images;
mod integrator;
mod label;
mod neighbors;
mod render;
mod selection;
mod state;
mod surface;
mod types;
mod weight;

pub use component::ForceGraphCanvas;
pub use config::GraphConfig;
pub use selection::SelectionSummary;
pub use types::{ColorTag, GraphData, GraphNode, NodeId};
pub use weight::WeightMetric;

#[cfg(test)]
pub(crate) use types::fixtures;
