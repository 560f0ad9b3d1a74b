//! Layout engine for computing cell rectangles.
//!
//! This module handles:
//! - Pre-computing column and row edges from widths and heights
//! - Placing spanned cells onto those edges
//! - Binary search for cell lookup at rendered coordinates

mod grid_layout;

pub use grid_layout::GridLayout;
