//! Read-only analytics dashboard over the Los Angeles County zip code dataset.
//!
//! The data layer (`data`) is usable on its own: load a file, filter it into a
//! [`data::filter::FilteredView`], summarise it and export it back to CSV.
//! `app`, `state` and `ui` put an egui front end on top.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
