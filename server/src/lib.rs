//! Charity Server
//!
//! Content management and donation intake backend for a nonprofit
//! website, built around a hardened file upload pipeline.

pub mod api;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod db;
pub mod donations;
pub mod email;
pub mod events;
pub mod news;
pub mod programs;
pub mod ratelimit;
pub mod team;
pub mod uploads;
pub mod util;
pub mod volunteers;
