//! Document Service - OCR, AI tax-data extraction and reconciliation for
//! client uploads.

pub mod config;
pub mod dtos;
pub mod extraction;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod workers;
