// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod commissions;
pub mod feedback;
pub mod general;
pub mod payments;
pub mod providers;
pub mod reports;
