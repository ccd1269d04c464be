//! HTTP handlers

pub mod data;
pub mod health;
pub mod model;
pub mod pages;
pub mod predict;
