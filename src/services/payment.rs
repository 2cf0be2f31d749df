// src/services/payment.rs

use crate::{
    auth::{AuthUser, Owner, authorize, require_admin},
    errors::{AppError, AppResult},
    models::*,
    services::{
        booking, email::EmailService, pricing::PricingService, razorpay::RazorpayService,
        settings,
    },
    state::AppState,
    store::TransferLeg,
};
use chrono::Utc;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

fn gateway(state: &AppState) -> AppResult<RazorpayService> {
    state
        .config
        .razorpay
        .clone()
        .map(RazorpayService::new)
        .ok_or_else(|| AppError::ServiceUnavailable("Payment gateway is not configured".to_string()))
}

/// Loads a booking the requester may pay for and checks nothing is recorded yet.
async fn payable_booking(state: &AppState, auth: &AuthUser, booking_id: Uuid) -> AppResult<Booking> {
    let booking = state
        .store
        .find_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    authorize(auth, &[Owner::User(booking.customer_id)], &[])?;

    if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
        return Err(AppError::Validation(format!(
            "A {:?} booking cannot be paid for",
            booking.status
        )));
    }

    if state.store.find_payment_by_booking(booking.id).await?.is_some() {
        return Err(AppError::Conflict(
            "Payment already exists for this booking".to_string(),
        ));
    }

    Ok(booking)
}

fn minor_units(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| AppError::Validation("Amount is out of range".to_string()))
}

/// Persists a captured payment with its commission and confirms the booking.
async fn record(
    state: &AppState,
    booking: &Booking,
    payment_method: String,
    transaction_id: String,
    gateway_order_id: Option<String>,
) -> AppResult<PaymentReceipt> {
    let now = Utc::now();
    let payment = Payment {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        customer_id: booking.customer_id,
        service_provider_id: booking.service_provider_id,
        amount: booking.total_amount,
        payment_method,
        transaction_id,
        gateway_order_id,
        payment_status: PaymentStatus::Completed,
        commission_amount: booking.commission_amount,
        provider_amount: booking.provider_earning,
        commission_transfer_status: TransferStatus::Pending,
        provider_transfer_status: TransferStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    let commission = Commission {
        id: Uuid::new_v4(),
        payment_id: payment.id,
        booking_id: booking.id,
        service_provider_id: booking.service_provider_id,
        amount: booking.commission_amount,
        rate: PricingService::derived_rate(booking.commission_amount, booking.total_amount),
        status: CommissionStatus::Pending,
        collection_date: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    let (payment, commission, booking) = state.store.record_payment(&payment, &commission).await?;
    info!(
        "Payment {} of {} recorded for booking {} (commission {})",
        payment.id, payment.amount, booking.id, commission.amount
    );

    notify_customer(state, &booking, &payment).await;

    Ok(PaymentReceipt {
        payment,
        commission,
        booking,
    })
}

/// Fire-and-forget confirmation mail; never fails the payment.
async fn notify_customer(state: &AppState, booking: &Booking, payment: &Payment) {
    if state.config.smtp.is_none() {
        return;
    }
    match settings::current(state).await {
        Ok(s) if s.notifications.email_on_payment => {}
        Ok(_) => return,
        Err(e) => {
            warn!("Skipping payment email, settings unavailable: {}", e);
            return;
        }
    }

    let customer = match state.store.find_user(booking.customer_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            warn!("Skipping payment email for booking {}: {}", booking.id, e);
            return;
        }
    };

    let email = EmailService::new(Arc::clone(&state.config));
    let booking = booking.clone();
    let payment = payment.clone();
    tokio::spawn(async move {
        if let Err(e) = email
            .send_booking_confirmed(&customer.email, &customer.name, &booking, &payment)
            .await
        {
            warn!("Booking confirmation email for {} failed: {}", booking.id, e);
        }
    });
}

pub async fn create(
    state: &AppState,
    auth: &AuthUser,
    req: CreatePaymentRequest,
) -> AppResult<PaymentReceipt> {
    let method = req.payment_method.trim().to_string();
    let transaction_id = req.transaction_id.trim().to_string();
    if method.is_empty() || transaction_id.is_empty() {
        return Err(AppError::Validation(
            "Payment method and transaction id are required".to_string(),
        ));
    }

    let booking = payable_booking(state, auth, req.booking_id).await?;
    record(state, &booking, method, transaction_id, None).await
}

pub async fn create_order(
    state: &AppState,
    auth: &AuthUser,
    req: CreateOrderRequest,
) -> AppResult<PaymentOrderResponse> {
    let gateway = gateway(state)?;
    let booking = payable_booking(state, auth, req.booking_id).await?;

    let amount = minor_units(booking.total_amount)?;
    let order = gateway
        .create_order(amount, &state.config.payment_currency, &booking.id.to_string())
        .await?;
    info!("Gateway order {} created for booking {}", order.id, booking.id);

    state
        .store
        .insert_gateway_order(&GatewayOrder {
            order_id: order.id.clone(),
            booking_id: booking.id,
            amount: order.amount,
            currency: order.currency.clone(),
            created_at: Utc::now(),
        })
        .await?;

    Ok(PaymentOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: gateway.key_id().to_string(),
        booking_id: booking.id,
    })
}

pub async fn verify(
    state: &AppState,
    auth: &AuthUser,
    req: VerifyPaymentRequest,
) -> AppResult<PaymentReceipt> {
    let gateway = gateway(state)?;
    if let Err(e) = gateway.verify_signature(
        &req.razorpay_order_id,
        &req.razorpay_payment_id,
        &req.razorpay_signature,
    ) {
        warn!(
            "Rejected gateway signature for order {}",
            req.razorpay_order_id
        );
        return Err(e);
    }

    let booking = payable_booking(state, auth, req.booking_id).await?;

    // A valid signature only proves the order was paid, not which booking it was for
    let order = state
        .store
        .find_gateway_order(&req.razorpay_order_id)
        .await?
        .filter(|o| o.booking_id == booking.id);
    let Some(order) = order else {
        warn!(
            "Gateway order {} was not issued for booking {}",
            req.razorpay_order_id, booking.id
        );
        return Err(AppError::VerificationFailed);
    };
    if order.amount != minor_units(booking.total_amount)? {
        return Err(AppError::Validation(
            "Order amount does not match the booking total".to_string(),
        ));
    }

    record(
        state,
        &booking,
        "razorpay".to_string(),
        req.razorpay_payment_id,
        Some(req.razorpay_order_id),
    )
    .await
}

pub async fn list(
    state: &AppState,
    auth: &AuthUser,
    page: PageQuery,
) -> AppResult<(Vec<Payment>, Pagination)> {
    require_admin(auth)?;
    let (payments, total) = state.store.list_payments(page).await?;
    Ok((payments, page.pagination(total)))
}

pub async fn get_by_booking(
    state: &AppState,
    auth: &AuthUser,
    booking_id: Uuid,
) -> AppResult<Payment> {
    let booking = booking::get(state, auth, booking_id).await?;
    state
        .store
        .find_payment_by_booking(booking.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No payment recorded for this booking".to_string()))
}

fn reject_revert(current: TransferStatus, requested: Option<TransferStatus>, leg: &str) -> AppResult<()> {
    match requested {
        Some(next) if current == TransferStatus::Completed && next != TransferStatus::Completed => {
            Err(AppError::Validation(format!(
                "The {leg} transfer is already completed"
            )))
        }
        _ => Ok(()),
    }
}

/// Admin settlement update. Completing the commission leg collects the
/// commission; completing the provider leg credits the provider. Both happen
/// at most once however often the same update is sent.
pub async fn update_status(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdatePaymentStatusRequest,
) -> AppResult<Payment> {
    require_admin(auth)?;
    let payment = state
        .store
        .find_payment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    if req.payment_status.is_none()
        && req.commission_transfer_status.is_none()
        && req.provider_transfer_status.is_none()
    {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    reject_revert(payment.commission_transfer_status, req.commission_transfer_status, "commission")?;
    reject_revert(payment.provider_transfer_status, req.provider_transfer_status, "provider")?;

    // Every check runs before the first write so a rejected update changes nothing
    let collect = match req.commission_transfer_status {
        Some(TransferStatus::Completed) => {
            let commission = state
                .store
                .find_commission_by_payment(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Commission not found for payment".to_string()))?;
            if commission.status == CommissionStatus::Refunded {
                return Err(AppError::Validation(
                    "The commission for this payment was refunded".to_string(),
                ));
            }
            Some(commission)
        }
        _ => None,
    };

    if let Some(status) = req.payment_status {
        state.store.set_payment_status(id, status).await?;
    }

    match (collect, req.commission_transfer_status) {
        (Some(commission), _) => {
            if let Some(collected) = state
                .store
                .collect_commission(commission.id, Utc::now(), None)
                .await?
            {
                info!("Commission {} collected ({})", collected.id, collected.amount);
            }
        }
        (None, Some(status)) => {
            state
                .store
                .set_transfer_status(id, TransferLeg::Commission, status)
                .await?;
        }
        (None, None) => {}
    }

    match req.provider_transfer_status {
        Some(TransferStatus::Completed) => {
            if state.store.credit_provider_transfer(id).await? {
                info!(
                    "Provider {} credited {} for payment {}",
                    payment.service_provider_id, payment.provider_amount, id
                );
            }
        }
        Some(status) => {
            state
                .store
                .set_transfer_status(id, TransferLeg::Provider, status)
                .await?;
        }
        None => {}
    }

    state
        .store
        .find_payment(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, RazorpayConfig},
        services::razorpay::expected_signature,
        test_support::TestApp,
    };
    use rust_decimal_macros::dec;

    struct Scenario {
        app: TestApp,
        customer: AuthUser,
        provider_id: Uuid,
        booking: Booking,
    }

    async fn scenario_with(app: TestApp, price: Decimal) -> Scenario {
        let pro = app.provider("Ravi", VerificationStatus::Verified).await;
        let (customer_row, customer) = app.customer("Asha").await;
        let listing = app.listing(&pro.profile, price).await;
        let booking = app.booking(&customer_row, &listing, Utc::now()).await;
        Scenario {
            app,
            customer,
            provider_id: pro.profile.id,
            booking,
        }
    }

    async fn scenario(price: Decimal) -> Scenario {
        scenario_with(TestApp::new(), price).await
    }

    fn direct(booking_id: Uuid, transaction_id: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            booking_id,
            payment_method: "upi".to_string(),
            transaction_id: transaction_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_payment_confirms_booking_and_derives_commission() {
        let s = scenario(dec!(200)).await;
        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();

        assert_eq!(receipt.booking.status, BookingStatus::Confirmed);
        assert_eq!(receipt.payment.payment_status, PaymentStatus::Completed);
        assert_eq!(receipt.payment.amount, dec!(200));
        assert_eq!(receipt.payment.provider_amount, dec!(180));
        assert_eq!(receipt.commission.amount, dec!(20));
        assert_eq!(receipt.commission.status, CommissionStatus::Pending);
        assert_eq!(receipt.commission.payment_id, receipt.payment.id);
        // the stored rate is reproducible from the amounts
        assert_eq!(
            receipt.commission.rate,
            PricingService::derived_rate(receipt.commission.amount, s.booking.total_amount)
        );
        assert_eq!(receipt.commission.rate, dec!(10));
    }

    #[tokio::test]
    async fn test_second_payment_for_booking_is_conflict() {
        let s = scenario(dec!(200)).await;
        create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();
        let again = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-2")).await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_even_without_precheck() {
        let s = scenario(dec!(200)).await;
        let first = record(&s.app.state, &s.booking, "upi".into(), "txn-1".into(), None).await;
        assert!(first.is_ok());
        let raced = record(&s.app.state, &s.booking, "upi".into(), "txn-2".into(), None).await;
        assert!(matches!(raced, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_booking_customer_may_pay() {
        let s = scenario(dec!(200)).await;
        let (_, stranger) = s.app.customer("Eve").await;
        let result = create(&s.app.state, &stranger, direct(s.booking.id, "txn-1")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_provider_transfer_credits_once() {
        let s = scenario(dec!(200)).await;
        let admin = s.app.admin().await;
        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();

        let complete = || UpdatePaymentStatusRequest {
            provider_transfer_status: Some(TransferStatus::Completed),
            ..Default::default()
        };
        update_status(&s.app.state, &admin, receipt.payment.id, complete())
            .await
            .unwrap();
        let payment = update_status(&s.app.state, &admin, receipt.payment.id, complete())
            .await
            .unwrap();
        assert_eq!(payment.provider_transfer_status, TransferStatus::Completed);

        let provider = s.app.state.store.find_provider(s.provider_id).await.unwrap().unwrap();
        assert_eq!(provider.total_earnings, dec!(180));
    }

    #[tokio::test]
    async fn test_commission_transfer_collects_commission_once() {
        let s = scenario(dec!(200)).await;
        let admin = s.app.admin().await;
        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();

        let complete = || UpdatePaymentStatusRequest {
            commission_transfer_status: Some(TransferStatus::Completed),
            ..Default::default()
        };
        update_status(&s.app.state, &admin, receipt.payment.id, complete())
            .await
            .unwrap();
        update_status(&s.app.state, &admin, receipt.payment.id, complete())
            .await
            .unwrap();

        let commission = s
            .app
            .state
            .store
            .find_commission(receipt.commission.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(commission.status, CommissionStatus::Collected);
        assert!(commission.collection_date.is_some());

        let provider = s.app.state.store.find_provider(s.provider_id).await.unwrap().unwrap();
        assert_eq!(provider.total_commission_paid, dec!(20));

        let buckets = s.app.state.store.list_admin_earnings(None, None).await.unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, Utc::now().date_naive());
        assert_eq!(buckets[0].total_commission_earned, dec!(20));
        assert_eq!(buckets[0].commission_ids, vec![commission.id]);
    }

    #[tokio::test]
    async fn test_completed_transfer_cannot_be_reverted() {
        let s = scenario(dec!(200)).await;
        let admin = s.app.admin().await;
        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();
        update_status(
            &s.app.state,
            &admin,
            receipt.payment.id,
            UpdatePaymentStatusRequest {
                provider_transfer_status: Some(TransferStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let revert = update_status(
            &s.app.state,
            &admin,
            receipt.payment.id,
            UpdatePaymentStatusRequest {
                provider_transfer_status: Some(TransferStatus::Pending),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(revert, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_gateway_unconfigured_is_service_unavailable() {
        let s = scenario(dec!(200)).await;
        let result = create_order(
            &s.app.state,
            &s.customer,
            CreateOrderRequest {
                booking_id: s.booking.id,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    fn gateway_config() -> Config {
        Config {
            razorpay: Some(RazorpayConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                key_id: "rzp_test_key".to_string(),
                key_secret: "s3cret".to_string(),
            }),
            ..Config::for_tests()
        }
    }

    async fn issue_order(app: &TestApp, order_id: &str, booking: &Booking) {
        app.state
            .store
            .insert_gateway_order(&GatewayOrder {
                order_id: order_id.to_string(),
                booking_id: booking.id,
                amount: minor_units(booking.total_amount).unwrap(),
                currency: "INR".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn signed(booking_id: Uuid, order_id: &str, payment_id: &str) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            booking_id,
            razorpay_order_id: order_id.to_string(),
            razorpay_payment_id: payment_id.to_string(),
            razorpay_signature: expected_signature(order_id, payment_id, "s3cret").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_verified_gateway_payment_is_recorded() {
        let s = scenario_with(TestApp::with_config(gateway_config()), dec!(150)).await;
        issue_order(&s.app, "order_1", &s.booking).await;

        let receipt = verify(&s.app.state, &s.customer, signed(s.booking.id, "order_1", "pay_1"))
            .await
            .unwrap();
        assert_eq!(receipt.payment.transaction_id, "pay_1");
        assert_eq!(receipt.payment.gateway_order_id.as_deref(), Some("order_1"));
        assert_eq!(receipt.payment.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_bad_signature_records_nothing() {
        let s = scenario_with(TestApp::with_config(gateway_config()), dec!(150)).await;
        let result = verify(
            &s.app.state,
            &s.customer,
            VerifyPaymentRequest {
                booking_id: s.booking.id,
                razorpay_order_id: "order_1".to_string(),
                razorpay_payment_id: "pay_1".to_string(),
                razorpay_signature: "deadbeef".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::VerificationFailed)));
        assert!(s
            .app
            .state
            .store
            .find_payment_by_booking(s.booking.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_order_for_another_booking_is_rejected() {
        let s = scenario_with(TestApp::with_config(gateway_config()), dec!(10000)).await;
        let customer_row = s.app.state.store.find_user(s.customer.id).await.unwrap().unwrap();
        let pro = s.app.provider("Kiran", VerificationStatus::Verified).await;
        let cheap_listing = s.app.listing(&pro.profile, dec!(100)).await;
        let cheap = s.app.booking(&customer_row, &cheap_listing, Utc::now()).await;
        issue_order(&s.app, "order_cheap", &cheap).await;

        // signature is genuine, but the order was issued for the cheap booking
        let result = verify(
            &s.app.state,
            &s.customer,
            signed(s.booking.id, "order_cheap", "pay_1"),
        )
        .await;
        assert!(matches!(result, Err(AppError::VerificationFailed)));

        let unknown = verify(&s.app.state, &s.customer, signed(s.booking.id, "order_x", "pay_2")).await;
        assert!(matches!(unknown, Err(AppError::VerificationFailed)));

        assert!(s
            .app
            .state
            .store
            .find_payment_by_booking(s.booking.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_order_amount_must_match_booking_total() {
        let s = scenario_with(TestApp::with_config(gateway_config()), dec!(150)).await;
        s.app
            .state
            .store
            .insert_gateway_order(&GatewayOrder {
                order_id: "order_short".to_string(),
                booking_id: s.booking.id,
                amount: 100,
                currency: "INR".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let result = verify(
            &s.app.state,
            &s.customer,
            signed(s.booking.id, "order_short", "pay_1"),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejected_settlement_update_changes_nothing() {
        let s = scenario(dec!(200)).await;
        let admin = s.app.admin().await;
        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();
        s.app
            .state
            .store
            .refund_commission(receipt.commission.id, None)
            .await
            .unwrap();

        let result = update_status(
            &s.app.state,
            &admin,
            receipt.payment.id,
            UpdatePaymentStatusRequest {
                payment_status: Some(PaymentStatus::Refunded),
                commission_transfer_status: Some(TransferStatus::Completed),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let stored = s.app.state.store.find_payment(receipt.payment.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Completed);
        assert_eq!(stored.commission_transfer_status, TransferStatus::Pending);
    }

    #[tokio::test]
    async fn test_booking_cancelled_before_insert_is_not_paid() {
        let s = scenario(dec!(200)).await;
        // passes the service precheck, then gets cancelled before the write
        let booking = payable_booking(&s.app.state, &s.customer, s.booking.id).await.unwrap();
        s.app
            .state
            .store
            .transition_booking(booking.id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await
            .unwrap();

        let result = record(&s.app.state, &booking, "upi".into(), "txn-1".into(), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(s
            .app
            .state
            .store
            .find_payment_by_booking(booking.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_confirmed_booking_can_still_be_paid() {
        let s = scenario(dec!(200)).await;
        s.app
            .state
            .store
            .transition_booking(s.booking.id, BookingStatus::Pending, BookingStatus::Confirmed)
            .await
            .unwrap();

        let receipt = create(&s.app.state, &s.customer, direct(s.booking.id, "txn-1"))
            .await
            .unwrap();
        assert_eq!(receipt.booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(minor_units(dec!(199.99)).unwrap(), 19999);
        assert_eq!(minor_units(dec!(200)).unwrap(), 20000);
    }
}
