//! gpui front end for [`spatialviz_scene`].
//!
//! [`SpatialCanvas`] owns a [`SpatialScene`](spatialviz_scene::SpatialScene),
//! paints its frames and feeds pointer input back into it.

mod edge;
mod node;
mod panel;
mod view;

pub use view::{NodeMoved, NodeSelected, SelectionCleared, SpatialCanvas};

pub use spatialviz_scene as scene;
