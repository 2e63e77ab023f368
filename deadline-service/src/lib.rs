//! Deadline Service - statutory filing calendars for accounting-firm clients.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
