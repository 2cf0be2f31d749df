// src/handlers/payments.rs

use crate::{
    auth::AuthUser,
    errors::AppResult,
    models::{
        CreateOrderRequest, CreatePaymentRequest, PageQuery, Payment, PaymentOrderResponse,
        PaymentReceipt, UpdatePaymentStatusRequest, VerifyPaymentRequest,
    },
    response::ApiResponse,
    services::payment,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Record a payment made outside the gateway
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded, booking confirmed", body = PaymentReceipt),
        (status = 403, description = "Not the booking's customer"),
        (status = 409, description = "Booking already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> AppResult<ApiResponse<PaymentReceipt>> {
    let receipt = payment::create(&state, &auth, body).await?;
    Ok(ApiResponse::created(receipt).with_message("Payment successful"))
}

/// Create a gateway order for checkout
#[utoipa::path(
    post,
    path = "/api/payments/order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Gateway order created", body = PaymentOrderResponse),
        (status = 409, description = "Booking already paid"),
        (status = 503, description = "Payment gateway not configured"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<PaymentOrderResponse>> {
    Ok(ApiResponse::ok(payment::create_order(&state, &auth, body).await?))
}

/// Verify the checkout signature and record the payment
#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 201, description = "Payment verified and recorded", body = PaymentReceipt),
        (status = 401, description = "Signature mismatch or order not issued for this booking"),
        (status = 409, description = "Booking already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn verify_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<VerifyPaymentRequest>,
) -> AppResult<ApiResponse<PaymentReceipt>> {
    let receipt = payment::verify(&state, &auth, body).await?;
    Ok(ApiResponse::created(receipt).with_message("Payment verified"))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    params(PageQuery),
    responses(
        (status = 200, description = "All payments, newest first", body = [Payment]),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<Payment>>> {
    let (payments, pagination) = payment::list(&state, &auth, page).await?;
    Ok(ApiResponse::paginated(payments, pagination))
}

#[utoipa::path(
    get,
    path = "/api/payments/booking/{booking_id}",
    params(("booking_id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Payment for the booking", body = Payment),
        (status = 404, description = "No payment recorded"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn booking_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<ApiResponse<Payment>> {
    Ok(ApiResponse::ok(payment::get_by_booking(&state, &auth, booking_id).await?))
}

/// Update payment and settlement statuses
#[utoipa::path(
    put,
    path = "/api/payments/{id}/status",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Completed transfer cannot be reverted"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePaymentStatusRequest>,
) -> AppResult<ApiResponse<Payment>> {
    Ok(ApiResponse::ok(payment::update_status(&state, &auth, id, body).await?))
}
