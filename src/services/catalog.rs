// src/services/catalog.rs

use crate::{
    auth::{AuthUser, Owner, authorize, require_admin, require_provider},
    errors::{AppError, AppResult},
    models::*,
    services::{pricing::PricingService, settings},
    state::AppState,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

// ─── Categories ───────────────────────────────────────────────────────────────

/// Admins see inactive categories too.
pub async fn list_categories(
    state: &AppState,
    auth: Option<&AuthUser>,
) -> AppResult<Vec<ServiceCategory>> {
    let active_only = !auth.is_some_and(AuthUser::is_admin);
    state.store.list_categories(active_only).await
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ServiceCategory> {
    state
        .store
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

pub async fn create_category(
    state: &AppState,
    auth: &AuthUser,
    req: CreateCategoryRequest,
) -> AppResult<ServiceCategory> {
    require_admin(auth)?;
    let now = Utc::now();
    let category = ServiceCategory {
        id: Uuid::new_v4(),
        name: required(&req.name, "Category name")?,
        description: req.description,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_category(&category).await
}

pub async fn update_category(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateCategoryRequest,
) -> AppResult<ServiceCategory> {
    require_admin(auth)?;
    let mut category = get_category(state, id).await?;

    if let Some(name) = req.name {
        category.name = required(&name, "Category name")?;
    }
    if let Some(description) = req.description {
        category.description = Some(description);
    }
    if let Some(is_active) = req.is_active {
        category.is_active = is_active;
    }

    state.store.save_category(&category).await
}

pub async fn delete_category(state: &AppState, auth: &AuthUser, id: Uuid) -> AppResult<()> {
    require_admin(auth)?;
    if !state.store.delete_category(id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }
    Ok(())
}

// ─── Listings ─────────────────────────────────────────────────────────────────

/// Bookable listings only: active, and offered by a verified provider.
pub async fn list_public(state: &AppState, filter: ListingFilter) -> AppResult<Vec<ServiceListing>> {
    state
        .store
        .list_listings(ListingFilter {
            active_only: true,
            verified_only: true,
            ..filter
        })
        .await
}

pub async fn get_listing(state: &AppState, id: Uuid) -> AppResult<ServiceListing> {
    state
        .store
        .find_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service listing not found".to_string()))
}

pub async fn list_mine(state: &AppState, auth: &AuthUser) -> AppResult<Vec<ServiceListing>> {
    let provider_id = require_provider(auth)?;
    state
        .store
        .list_listings(ListingFilter {
            provider_id: Some(provider_id),
            ..Default::default()
        })
        .await
}

async fn provider_profile(state: &AppState, id: Uuid) -> AppResult<ServiceProvider> {
    state
        .store
        .find_provider(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service provider not found".to_string()))
}

async fn active_category(state: &AppState, id: Uuid) -> AppResult<ServiceCategory> {
    let category = get_category(state, id).await?;
    if !category.is_active {
        return Err(AppError::Validation("Category is not active".to_string()));
    }
    Ok(category)
}

/// Recomputes the stored split from the provider's effective rate.
async fn reprice(state: &AppState, listing: &mut ServiceListing) -> AppResult<()> {
    let provider = provider_profile(state, listing.service_provider_id).await?;
    let settings = settings::current(state).await?;
    let rate = PricingService::resolve_rate(&provider, &settings);
    let split = PricingService::split(listing.service_price, rate);

    listing.commission_rate = rate;
    listing.commission_amount = split.commission_amount;
    listing.provider_earning = split.provider_earning;
    Ok(())
}

pub async fn create_listing(
    state: &AppState,
    auth: &AuthUser,
    req: CreateListingRequest,
) -> AppResult<ServiceListing> {
    let provider_id = require_provider(auth)?;
    PricingService::validate_price(req.service_price)?;
    active_category(state, req.category_id).await?;

    let now = Utc::now();
    let mut listing = ServiceListing {
        id: Uuid::new_v4(),
        service_provider_id: provider_id,
        category_id: req.category_id,
        title: required(&req.title, "Title")?,
        service_details: required(&req.service_details, "Service details")?,
        service_price: req.service_price,
        commission_rate: Default::default(),
        commission_amount: Default::default(),
        provider_earning: Default::default(),
        tags: req.tags,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    reprice(state, &mut listing).await?;

    let listing = state.store.insert_listing(&listing).await?;
    info!("Provider {} created listing {}", provider_id, listing.id);
    Ok(listing)
}

pub async fn update_listing(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
    req: UpdateListingRequest,
) -> AppResult<ServiceListing> {
    let mut listing = get_listing(state, id).await?;
    authorize(
        auth,
        &[Owner::Provider(listing.service_provider_id)],
        &[UserRole::ServiceProvider],
    )?;

    if let Some(category_id) = req.category_id {
        active_category(state, category_id).await?;
        listing.category_id = category_id;
    }
    if let Some(title) = req.title {
        listing.title = required(&title, "Title")?;
    }
    if let Some(details) = req.service_details {
        listing.service_details = required(&details, "Service details")?;
    }
    if let Some(price) = req.service_price {
        PricingService::validate_price(price)?;
        listing.service_price = price;
    }
    if let Some(tags) = req.tags {
        listing.tags = tags;
    }
    if let Some(is_active) = req.is_active {
        listing.is_active = is_active;
    }
    // bookings already made keep their own snapshot of the old split
    reprice(state, &mut listing).await?;

    state.store.save_listing(&listing).await
}

pub async fn deactivate_listing(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> AppResult<ServiceListing> {
    let mut listing = get_listing(state, id).await?;
    authorize(
        auth,
        &[Owner::Provider(listing.service_provider_id)],
        &[UserRole::ServiceProvider],
    )?;
    listing.is_active = false;
    state.store.save_listing(&listing).await
}
