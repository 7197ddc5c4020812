use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::{
    HouseService, InviteService, MemberService, ProvisioningHandler, SettingsService,
    TenantContextResolver,
};
use domain::store::Stores;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    init_metrics, metrics_handler, metrics_middleware, require_user_auth, trace_id,
};
use crate::routes::{auth, health, houses, invites, me, members, onboarding, settings};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Result<Self, JwtError> {
        let jwt = config.jwt.build()?;
        Ok(Self {
            config: Arc::new(config),
            stores,
            jwt: Arc::new(jwt),
        })
    }

    pub fn invite_service(&self) -> InviteService {
        InviteService::new(
            self.stores.invites.clone(),
            self.config.onboarding.max_invite_ttl_days,
        )
    }

    pub fn settings_service(&self) -> SettingsService {
        SettingsService::new(self.stores.settings.clone())
    }

    pub fn tenant_resolver(&self) -> TenantContextResolver {
        TenantContextResolver::new(&self.stores)
    }

    pub fn house_service(&self) -> HouseService {
        HouseService::new(self.stores.clone())
    }

    pub fn member_service(&self) -> MemberService {
        MemberService::new(self.stores.members.clone())
    }

    pub fn provisioning_handler(&self) -> ProvisioningHandler {
        ProvisioningHandler::new(
            self.stores.clone(),
            self.config.onboarding.require_approval,
        )
    }
}

pub fn create_app(config: Config, stores: Stores) -> Result<Router, JwtError> {
    let state = AppState::new(config, stores)?;
    let config = state.config.clone();
    init_metrics();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Routes that need a signed-in account
    let user_routes = Router::new()
        .route(
            "/api/v1/houses",
            post(houses::create_house).get(houses::list_houses),
        )
        .route(
            "/api/v1/me/house",
            get(me::get_active_house).put(me::switch_house),
        )
        .route(
            "/api/v1/invites",
            post(invites::create_invite).get(invites::list_invites),
        )
        .route(
            "/api/v1/onboarding-settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/api/v1/onboarding-settings/import",
            post(settings::import_settings),
        )
        .route("/api/v1/members", get(members::list_members))
        .route(
            "/api/v1/members/:member_id/approve",
            post(members::approve_member),
        )
        .route(
            "/api/v1/members/:member_id/reject",
            post(members::reject_member),
        )
        .route(
            "/api/v1/members/:member_id/active",
            put(members::set_member_active),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Invitees have no account yet. DELETE on the same path checks auth in
    // its own extractor since it shares the path with the public lookup.
    let public_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route(
            "/api/v1/invites/:invite",
            get(onboarding::get_invite).delete(invites::revoke_invite),
        )
        .route(
            "/api/v1/invites/:invite/accept",
            post(onboarding::accept_invite),
        )
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let app = Router::new()
        .merge(user_routes)
        .merge(public_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(app)
}
