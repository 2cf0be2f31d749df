// src/services/mod.rs

pub mod admin;
pub mod auth;
pub mod booking;
pub mod catalog;
pub mod commission;
pub mod complaint;
pub mod email;
pub mod payment;
pub mod pricing;
pub mod provider;
pub mod razorpay;
pub mod report;
pub mod review;
pub mod settings;
