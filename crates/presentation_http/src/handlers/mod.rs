//! HTTP request handlers

pub mod calendar;
pub mod health;
pub mod tasks;
