//! HTTP endpoint handlers

pub mod form;
pub mod predict;

pub use predict::{estimate, InputError, PredictForm, PredictResponse, Scenario};
