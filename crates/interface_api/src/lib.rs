//! HTTP API Layer
//!
//! This crate provides the REST API for the bill-splitting service using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for users, groups, bills, payments and expenses
//! - **Middleware**: Bearer-token authentication and audit logging
//! - **DTOs**: camelCase request/response bodies
//! - **Error Handling**: Consistent `{ error, message }` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::from_pool(pool, config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod extract;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::HealthCheckable;
use domain_billing::{BillingPort, BillingService, ExpensePort, ExpenseService};
use domain_group::{GroupPort, GroupService};
use domain_identity::{IdentityService, UserPort};
use infra_db::{
    DatabasePool, PostgresBillingAdapter, PostgresExpenseAdapter, PostgresGroupAdapter,
    PostgresUserAdapter,
};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware, oauth_proxy_middleware};
use crate::handlers::{bills, expenses, groups, health, payments, users};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub groups: GroupService,
    pub billing: BillingService,
    pub expenses: ExpenseService,
    /// Storage adapters checked by the readiness endpoint
    pub health: Vec<Arc<dyn HealthCheckable>>,
    pub config: ApiConfig,
}

impl AppState {
    /// Wires the services over a set of storage adapters
    pub fn from_ports<U, G, B, E>(
        users: Arc<U>,
        group_port: Arc<G>,
        bill_port: Arc<B>,
        expense_port: Arc<E>,
        config: ApiConfig,
    ) -> Self
    where
        U: UserPort,
        G: GroupPort,
        B: BillingPort,
        E: ExpensePort,
    {
        let health: Vec<Arc<dyn HealthCheckable>> = vec![
            users.clone(),
            group_port.clone(),
            bill_port.clone(),
            expense_port.clone(),
        ];

        let identity = IdentityService::new(users);
        let groups = GroupService::new(group_port.clone(), identity.clone());
        let billing = BillingService::new(bill_port, group_port);
        let expenses = ExpenseService::new(expense_port);

        Self {
            identity,
            groups,
            billing,
            expenses,
            health,
            config,
        }
    }

    /// Wires the services over the PostgreSQL adapters
    pub fn from_pool(pool: DatabasePool, config: ApiConfig) -> Self {
        Self::from_ports(
            Arc::new(PostgresUserAdapter::new(pool.clone())),
            Arc::new(PostgresGroupAdapter::new(pool.clone())),
            Arc::new(PostgresBillingAdapter::new(pool.clone())),
            Arc::new(PostgresExpenseAdapter::new(pool)),
            config,
        )
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Services and configuration shared by every handler
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login));

    // Called server-to-server by the OAuth front end after the provider
    // has verified the user
    let oauth_routes = Router::new()
        .route("/api/users/auth/google", post(users::google_sign_in))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            oauth_proxy_middleware,
        ));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route(
            "/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/:id/bills", get(users::user_bills));

    let group_routes = Router::new()
        .route("/", post(groups::create_group).get(groups::list_groups))
        .route("/members", post(groups::add_member))
        .route(
            "/:id",
            get(groups::get_group).put(groups::update_group).delete(groups::delete_group),
        )
        .route("/:id/bills", post(groups::create_group_bill));

    let bill_routes = Router::new()
        .route("/", post(bills::create_bill))
        .route("/:id", get(bills::get_bill).delete(bills::delete_bill));

    let expense_routes = Router::new()
        .route("/", post(expenses::create_expense).get(expenses::list_expenses))
        .route(
            "/:id",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/groups", group_routes)
        .nest("/bills", bill_routes)
        .route("/payments", put(payments::record_payment))
        .nest("/expenses", expense_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(oauth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
