#![forbid(unsafe_code)]

//! Core: geometry and pointer primitives for the widget grid.
//!
//! # Role in gridtile
//! `gridtile-core` is the input layer. It owns the cell-space [`Rect`]
//! (called a *zone* when it is not attached to an item) and the pointer
//! vocabulary consumed by interaction sessions: resize handle tokens, grid
//! deltas, axis dominance, and the pixel → cell transform.
//!
//! # How it fits in the system
//! `gridtile-layout` builds every engine component (occupancy, fit search,
//! repacking, pushing, swapping, sessions) on top of these types. Nothing in
//! this crate knows about items or layouts.
//!
//! [`Rect`]: geometry::Rect

pub mod geometry;
pub mod pointer;
