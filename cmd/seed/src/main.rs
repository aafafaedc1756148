//! Fills a development database with demo accounts, listings and weekly hours.
//!
//! Safe to re-run: accounts that already exist are skipped along with their
//! listings.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use auth_adapters::JwtAuthProvider;
use configs::Settings;
use domains::{AppError, AvailabilitySlot, Identity, NewService, Role, SystemClock};
use services::{AccountService, AvailabilityService, CatalogService, RegisterRequest};
use storage_adapters::SqliteStore;

const DEMO_PASSWORD: &str = "password123";

struct DemoProvider {
    name: &'static str,
    email: &'static str,
    location: &'static str,
    bio: &'static str,
    listings: &'static [(&'static str, &'static str, f64)],
}

const PROVIDERS: &[DemoProvider] = &[
    DemoProvider {
        name: "Priya Sharma",
        email: "priya@skillbridge.dev",
        location: "Leeds",
        bio: "Licensed plumber, fifteen years on the tools.",
        listings: &[
            ("Leak repair", "Plumbing", 45.0),
            ("Boiler service", "Plumbing", 80.0),
        ],
    },
    DemoProvider {
        name: "Tom Okafor",
        email: "tom@skillbridge.dev",
        location: "Manchester",
        bio: "Electrician and smart-home installer.",
        listings: &[
            ("Socket installation", "Electrical", 35.0),
            ("Lighting upgrade", "Electrical", 60.0),
        ],
    },
    DemoProvider {
        name: "Mei Lin",
        email: "mei@skillbridge.dev",
        location: "Leeds",
        bio: "Maths and physics tutor, GCSE to A-level.",
        listings: &[("Maths tutoring", "Tutoring", 25.0)],
    },
];

const USERS: &[(&str, &str, &str)] = &[
    ("Alice Walker", "alice@skillbridge.dev", "Leeds"),
    ("Ben Carter", "ben@skillbridge.dev", "Manchester"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let store = Arc::new(
        SqliteStore::connect(&settings.database.url, settings.database.max_connections)
            .await
            .context("failed to open database")?,
    );
    let auth = Arc::new(JwtAuthProvider::new(
        &settings.auth.jwt_secret,
        chrono::Duration::minutes(settings.auth.token_ttl_minutes),
    ));
    let clock = Arc::new(SystemClock);

    let accounts = AccountService::new(store.clone(), auth, clock.clone());
    let catalog = CatalogService::new(store.clone(), store.clone(), clock);
    let availability = AvailabilityService::new(store);

    for provider in PROVIDERS {
        let request = RegisterRequest {
            name: provider.name.into(),
            email: provider.email.into(),
            password: DEMO_PASSWORD.into(),
            role: Role::Provider,
            age: None,
            location: Some(provider.location.into()),
            bio: Some(provider.bio.into()),
            mobile: None,
        };
        let Some(user) = register(&accounts, request).await? else {
            continue;
        };
        let identity = Identity {
            user_id: user,
            role: Role::Provider,
        };

        for (name, category, price) in provider.listings {
            catalog
                .create_service(
                    &identity,
                    NewService {
                        service_name: (*name).into(),
                        description: Some(format!("{name} by {}", provider.name)),
                        min_price: *price,
                        category: (*category).into(),
                        image_url: None,
                    },
                )
                .await?;
        }

        // Weekdays, nine to five.
        for day_of_week in 0..5 {
            availability
                .set_availability(
                    &identity,
                    AvailabilitySlot {
                        day_of_week,
                        start_time: "09:00".into(),
                        end_time: "17:00".into(),
                    },
                )
                .await?;
        }
        info!(email = provider.email, listings = provider.listings.len(), "seeded provider");
    }

    for (name, email, location) in USERS {
        let request = RegisterRequest {
            name: (*name).into(),
            email: (*email).into(),
            password: DEMO_PASSWORD.into(),
            role: Role::User,
            age: None,
            location: Some((*location).into()),
            bio: None,
            mobile: None,
        };
        if register(&accounts, request).await?.is_some() {
            info!(email, "seeded user");
        }
    }

    info!(password = DEMO_PASSWORD, "seed complete");
    Ok(())
}

/// Registers an account, returning its id, or `None` when the email is taken.
async fn register(accounts: &AccountService, request: RegisterRequest) -> anyhow::Result<Option<i64>> {
    let email = request.email.clone();
    match accounts.register(request).await {
        Ok(user) => Ok(Some(user.id)),
        Err(AppError::Conflict(_)) => {
            warn!(%email, "already registered, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
