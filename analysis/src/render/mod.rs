//! Renderer-facing descriptions of figures.
//!
//! Nothing here draws pixels; it produces the data an external charting
//! tool needs.

pub mod sankey;

pub use sankey::{label_color, NodeLayout, SankeyDiagram, SankeyLink, SankeyNode, SankeyOptions};
