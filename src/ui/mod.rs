//! Interaction models for the page: hover tooltip and selection flow
//!
//! Both are plain state machines. They decide what to show and where; the
//! browser glue (or a JS shim) renders the result.

pub mod tooltip;
pub mod selection;

pub use selection::{FlowEffect, FlowState, SelectionContext, SelectionFlow};
pub use tooltip::{HoverTooltip, Point, TooltipView, Viewport};
