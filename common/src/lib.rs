//! Types shared between the teaching-hours backend and its clients, plus the
//! pure load arithmetic every dashboard and report is computed with.

pub mod jobs;
pub mod load;
pub mod model;
pub mod requests;
