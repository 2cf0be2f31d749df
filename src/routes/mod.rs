// src/routes/mod.rs

use crate::{
    handlers::{
        admin::{
            dashboard, get_settings, list_providers, list_users, set_user_status,
            update_settings, verify_provider,
        },
        auth::{forgot_password, login, me, register, reset_password, update_profile},
        bookings::{
            create_booking, customer_bookings, get_booking, provider_bookings,
            update_booking_status,
        },
        catalog::{
            create_category, create_listing, deactivate_listing, delete_category, get_category,
            get_listing, list_categories, list_listings, my_listings, update_category,
            update_listing,
        },
        commissions::{admin_earnings, list_commissions, provider_commissions, update_commission},
        feedback::{
            create_complaint, create_review, customer_complaints, list_complaints,
            listing_reviews, update_complaint,
        },
        payments::{
            booking_payment, create_order, create_payment, list_payments, update_payment_status,
            verify_payment,
        },
        providers::{get_provider, my_earnings, my_profile, update_my_profile},
        reports::{
            bookings_report, complaints_report, create_report, customers_report, delete_report,
            get_report, list_reports, providers_report, revenue_report,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/profile", put(update_profile))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/{token}", put(reset_password))
        // ─── Catalog ──────────────────────────────────────────
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/listings", get(list_listings).post(create_listing))
        .route("/listings/mine", get(my_listings))
        .route(
            "/listings/{id}",
            get(get_listing).put(update_listing).delete(deactivate_listing),
        )
        // ─── Providers ────────────────────────────────────────
        .route("/providers/me", get(my_profile).put(update_my_profile))
        .route("/providers/me/earnings", get(my_earnings))
        .route("/providers/{id}", get(get_provider))
        // ─── Bookings ─────────────────────────────────────────
        .route("/bookings", post(create_booking))
        .route("/bookings/customer", get(customer_bookings))
        .route("/bookings/provider", get(provider_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", put(update_booking_status))
        // ─── Payments ─────────────────────────────────────────
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/order", post(create_order))
        .route("/payments/verify", post(verify_payment))
        .route("/payments/booking/{booking_id}", get(booking_payment))
        .route("/payments/{id}/status", put(update_payment_status))
        // ─── Commissions ──────────────────────────────────────
        .route("/commissions", get(list_commissions))
        .route("/commissions/earnings", get(admin_earnings))
        .route("/commissions/provider/{provider_id}", get(provider_commissions))
        .route("/commissions/{id}", put(update_commission))
        // ─── Complaints & Reviews ─────────────────────────────
        .route("/complaints", get(list_complaints).post(create_complaint))
        .route("/complaints/customer", get(customer_complaints))
        .route("/complaints/{id}", put(update_complaint))
        .route("/reviews", post(create_review))
        .route("/reviews/listing/{listing_id}", get(listing_reviews))
        // ─── Reports ──────────────────────────────────────────
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/revenue", get(revenue_report))
        .route("/reports/bookings", get(bookings_report))
        .route("/reports/providers", get(providers_report))
        .route("/reports/customers", get(customers_report))
        .route("/reports/complaints", get(complaints_report))
        .route("/reports/{id}", get(get_report).delete(delete_report))
        // ─── Admin & Settings ─────────────────────────────────
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}/status", put(set_user_status))
        .route("/admin/providers", get(list_providers))
        .route("/admin/providers/{id}/verify", put(verify_provider))
        .route("/settings", get(get_settings).put(update_settings))
}
