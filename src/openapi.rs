// src/openapi.rs

use crate::models::{
    Address, AdminEarnings, AuthResponse, Booking, BookingStatus, Commission, CommissionSettings,
    CommissionStatus, Complaint, ComplaintStatus, CountPoint, CreateBookingRequest,
    CreateCategoryRequest, CreateComplaintRequest, CreateListingRequest, CreateOrderRequest,
    CreatePaymentRequest, CreateReportRequest, CreateReviewRequest, CustomersReport, Dashboard,
    DashboardCounts, DashboardFinancials, ForgotPasswordRequest, GeneralSettings, ListingReviews,
    LoginRequest, NotificationSettings, Pagination, Payment, PaymentOrderResponse,
    PaymentReceipt, PaymentStatus, ProviderEarnings, ProvidersReport, RegisterRequest, Report,
    ReportType, ResetPasswordRequest, RevenuePoint, RevenueReport, RevenueSummary, Review,
    SecuritySettings, ServiceCategory, ServiceListing, ServiceProvider, Settings,
    StatusBreakdownReport, TimeFrame, TopProvider, TransferStatus, UpdateBookingStatusRequest,
    UpdateCategoryRequest, UpdateCommissionRequest, UpdateComplaintRequest,
    UpdateListingRequest, UpdatePaymentStatusRequest, UpdateProfileRequest,
    UpdateProviderRequest, UpdateSettingsRequest, UpdateUserStatusRequest, User, UserRole,
    VerificationStatus, VerifyPaymentRequest, VerifyProviderRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fixly API",
        version = "1.0.0",
        description = "Home services marketplace API built with Rust and Axum. \
            Customers book service listings and pay through Razorpay or a recorded \
            transfer; the platform splits each payment into a provider share and a \
            commission, and admins settle, report on and moderate the marketplace. \
            Errors use the body {success: false, message}. Duplicates and stale \
            settings versions return 409 Conflict, and an unconfigured gateway or \
            email service or a disconnected database returns 503 Service Unavailable.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::update_profile,
        crate::handlers::auth::forgot_password,
        crate::handlers::auth::reset_password,
        // Catalog
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::get_category,
        crate::handlers::catalog::create_category,
        crate::handlers::catalog::update_category,
        crate::handlers::catalog::delete_category,
        crate::handlers::catalog::list_listings,
        crate::handlers::catalog::get_listing,
        crate::handlers::catalog::my_listings,
        crate::handlers::catalog::create_listing,
        crate::handlers::catalog::update_listing,
        crate::handlers::catalog::deactivate_listing,
        // Providers
        crate::handlers::providers::my_profile,
        crate::handlers::providers::update_my_profile,
        crate::handlers::providers::my_earnings,
        crate::handlers::providers::get_provider,
        // Bookings
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::customer_bookings,
        crate::handlers::bookings::provider_bookings,
        crate::handlers::bookings::get_booking,
        crate::handlers::bookings::update_booking_status,
        // Payments
        crate::handlers::payments::create_payment,
        crate::handlers::payments::create_order,
        crate::handlers::payments::verify_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::booking_payment,
        crate::handlers::payments::update_payment_status,
        // Commissions
        crate::handlers::commissions::list_commissions,
        crate::handlers::commissions::provider_commissions,
        crate::handlers::commissions::admin_earnings,
        crate::handlers::commissions::update_commission,
        // Complaints & Reviews
        crate::handlers::feedback::create_complaint,
        crate::handlers::feedback::customer_complaints,
        crate::handlers::feedback::list_complaints,
        crate::handlers::feedback::update_complaint,
        crate::handlers::feedback::create_review,
        crate::handlers::feedback::listing_reviews,
        // Reports
        crate::handlers::reports::revenue_report,
        crate::handlers::reports::bookings_report,
        crate::handlers::reports::providers_report,
        crate::handlers::reports::customers_report,
        crate::handlers::reports::complaints_report,
        crate::handlers::reports::create_report,
        crate::handlers::reports::list_reports,
        crate::handlers::reports::get_report,
        crate::handlers::reports::delete_report,
        // Admin & Settings
        crate::handlers::admin::dashboard,
        crate::handlers::admin::list_users,
        crate::handlers::admin::set_user_status,
        crate::handlers::admin::list_providers,
        crate::handlers::admin::verify_provider,
        crate::handlers::admin::get_settings,
        crate::handlers::admin::update_settings,
    ),
    components(
        schemas(
            UserRole, Address, User, RegisterRequest, LoginRequest, AuthResponse,
            UpdateProfileRequest, ForgotPasswordRequest, ResetPasswordRequest,
            UpdateUserStatusRequest,
            VerificationStatus, ServiceProvider, UpdateProviderRequest, VerifyProviderRequest,
            ProviderEarnings,
            ServiceCategory, CreateCategoryRequest, UpdateCategoryRequest,
            ServiceListing, CreateListingRequest, UpdateListingRequest,
            BookingStatus, Booking, CreateBookingRequest, UpdateBookingStatusRequest,
            PaymentStatus, TransferStatus, Payment, CreatePaymentRequest, CreateOrderRequest,
            PaymentOrderResponse, VerifyPaymentRequest, UpdatePaymentStatusRequest, PaymentReceipt,
            CommissionStatus, Commission, UpdateCommissionRequest, AdminEarnings,
            ComplaintStatus, Complaint, CreateComplaintRequest, UpdateComplaintRequest,
            Review, CreateReviewRequest, ListingReviews,
            ReportType, TimeFrame, Report, CreateReportRequest, RevenueSummary, RevenuePoint,
            RevenueReport, CountPoint, StatusBreakdownReport, TopProvider, ProvidersReport,
            CustomersReport, Dashboard, DashboardCounts, DashboardFinancials,
            GeneralSettings, CommissionSettings, NotificationSettings, SecuritySettings,
            Settings, UpdateSettingsRequest, Pagination,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Accounts, sessions and password reset"),
        (name = "Categories", description = "Service categories"),
        (name = "Listings", description = "Service listings and their commission split"),
        (name = "Providers", description = "Provider profiles and earnings"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Payments", description = "Payments and settlement"),
        (name = "Commissions", description = "Commission collection and daily earnings"),
        (name = "Complaints", description = "Customer complaints"),
        (name = "Reviews", description = "Ratings for completed bookings"),
        (name = "Reports", description = "Aggregated reports"),
        (name = "Admin", description = "Dashboard, users and provider verification"),
        (name = "Settings", description = "Platform settings"),
    )
)]
pub struct ApiDoc;
