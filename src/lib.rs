//! wordburn: burndown tracking for writing projects.
//!
//! One flat CSV holds every project's progress samples; an interactive menu
//! appends new samples and renders a terminal burndown chart against the
//! ideal linear decline to the goal date.
//!
//! The core is two components composed linearly: [`store::Store`] owns the
//! shared flat file, [`project::ProjectSession`] owns one project's in-memory
//! series and derives new samples from reported word-count totals. The chart
//! and menu are thin collaborators on top.

pub mod chart;
pub mod config;
pub mod error;
pub mod menu;
pub mod project;
pub mod schedule;
pub mod store;
