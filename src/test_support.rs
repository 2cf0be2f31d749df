// src/test_support.rs

//! Fixtures shared by service and router tests.

use crate::{
    auth::{AuthUser, generate_token},
    config::Config,
    models::*,
    state::AppState,
    store::memory::MemoryStore,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub struct SeededProvider {
    pub user: User,
    pub profile: ServiceProvider,
    pub auth: AuthUser,
}

pub fn auth_user(role: UserRole) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        role,
        provider_id: (role == UserRole::ServiceProvider).then(Uuid::new_v4),
    }
}

pub fn user_row(name: &str, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        // unique so the same fixture name can be seeded twice
        email: format!(
            "{}.{}@example.com",
            name.to_lowercase().replace(' ', "."),
            &Uuid::new_v4().simple().to_string()[..8]
        ),
        phone: None,
        password_hash: "not-a-real-hash".to_string(),
        role,
        is_active: true,
        address: Address::default(),
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::for_tests())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        Self { state, store }
    }

    pub fn token(&self, user: &AuthUser) -> String {
        generate_token(user.id, user.role, user.provider_id, &self.state.config.jwt_secret, 1)
            .unwrap()
    }

    async fn insert(&self, user: User, provider: Option<&ServiceProvider>) -> User {
        self.state.store.insert_user(&user, provider).await.unwrap()
    }

    pub async fn customer(&self, name: &str) -> (User, AuthUser) {
        let user = self.insert(user_row(name, UserRole::Customer), None).await;
        let auth = AuthUser { id: user.id, role: user.role, provider_id: None };
        (user, auth)
    }

    pub async fn admin(&self) -> AuthUser {
        let user = self.insert(user_row("Admin", UserRole::Admin), None).await;
        AuthUser { id: user.id, role: user.role, provider_id: None }
    }

    pub async fn provider(&self, name: &str, status: VerificationStatus) -> SeededProvider {
        let user = user_row(name, UserRole::ServiceProvider);
        let now = Utc::now();
        let profile = ServiceProvider {
            id: Uuid::new_v4(),
            user_id: user.id,
            business_name: format!("{name} Services"),
            description: None,
            verification_status: status,
            commission_rate: None,
            total_earnings: Decimal::ZERO,
            total_commission_paid: Decimal::ZERO,
            category_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let user = self.insert(user, Some(&profile)).await;
        let auth = AuthUser {
            id: user.id,
            role: user.role,
            provider_id: Some(profile.id),
        };
        SeededProvider { user, profile, auth }
    }

    pub async fn category(&self, name: &str) -> ServiceCategory {
        let now = Utc::now();
        self.state
            .store
            .insert_category(&ServiceCategory {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    /// Listing priced at `price` with the default 10% split.
    pub async fn listing(&self, provider: &ServiceProvider, price: Decimal) -> ServiceListing {
        let category = self.category(&format!("Category {}", Uuid::new_v4())).await;
        let commission_amount = price / Decimal::TEN;
        let now = Utc::now();
        self.state
            .store
            .insert_listing(&ServiceListing {
                id: Uuid::new_v4(),
                service_provider_id: provider.id,
                category_id: category.id,
                title: "Pipe repair".to_string(),
                service_details: "Fix leaking kitchen pipes".to_string(),
                service_price: price,
                commission_rate: Decimal::TEN,
                commission_amount,
                provider_earning: price - commission_amount,
                tags: vec!["plumbing".to_string()],
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }

    pub async fn booking(
        &self,
        customer: &User,
        listing: &ServiceListing,
        created_at: DateTime<Utc>,
    ) -> Booking {
        self.state
            .store
            .insert_booking(&Booking {
                id: Uuid::new_v4(),
                customer_id: customer.id,
                service_provider_id: listing.service_provider_id,
                service_listing_id: listing.id,
                service_date_time: created_at,
                special_instructions: None,
                total_amount: listing.service_price,
                commission_amount: listing.commission_amount,
                provider_earning: listing.provider_earning,
                status: BookingStatus::Pending,
                created_at,
                updated_at: created_at,
            })
            .await
            .unwrap()
    }

    /// Completed payment for `booking`, stamped at `at`, with its commission.
    pub async fn payment(&self, booking: &Booking, at: DateTime<Utc>) -> Payment {
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            customer_id: booking.customer_id,
            service_provider_id: booking.service_provider_id,
            amount: booking.total_amount,
            payment_method: "upi".to_string(),
            transaction_id: format!("txn-{}", booking.id),
            gateway_order_id: None,
            payment_status: PaymentStatus::Completed,
            commission_amount: booking.commission_amount,
            provider_amount: booking.provider_earning,
            commission_transfer_status: TransferStatus::Pending,
            provider_transfer_status: TransferStatus::Pending,
            created_at: at,
            updated_at: at,
        };
        let commission = Commission {
            id: Uuid::new_v4(),
            payment_id: payment.id,
            booking_id: booking.id,
            service_provider_id: booking.service_provider_id,
            amount: booking.commission_amount,
            rate: Decimal::TEN,
            status: CommissionStatus::Pending,
            collection_date: None,
            notes: None,
            created_at: at,
            updated_at: at,
        };
        let (payment, _, _) = self
            .state
            .store
            .record_payment(&payment, &commission)
            .await
            .unwrap();
        payment
    }
}
