use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{AuthError, TokenService};
use crate::config::AppConfig;
use crate::database::{ComponentRepository, DatabaseManager, UserRepository};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::MenuService;

/// Everything a handler needs, built once at startup and cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseManager,
    pub components: ComponentRepository,
    pub menus: MenuService,
    pub users: UserRepository,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseManager) -> Result<Self, AuthError> {
        let tokens = TokenService::from_config(&config.security)?;
        let menus = MenuService::new(db.clone());
        Ok(Self {
            config: Arc::new(config),
            components: menus.components().clone(),
            users: UserRepository::new(db.pool().clone()),
            menus,
            db,
            tokens,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/whoami", get(protected::auth::whoami))
        .merge(component_routes())
        .merge(menu_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::auth::login))
        // Protected
        .nest("/api", api)
        // Global middleware
        .layer(RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(state.config.api.request_timeout_secs)))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn component_routes() -> Router<AppState> {
    use protected::components;

    Router::new()
        .route("/components", get(components::list).post(components::create))
        .route("/components/keys", get(components::keys))
        .route(
            "/components/:id",
            get(components::get)
                .put(components::update)
                .delete(components::delete),
        )
}

fn menu_routes() -> Router<AppState> {
    use protected::menus;

    Router::new()
        .route(
            "/menus/:scope",
            get(menus::list).post(menus::bind).delete(menus::clear),
        )
        .route("/menus/:scope/items", post(menus::create_item))
        .route(
            "/menus/:scope/items/:component_id",
            get(menus::get_item)
                .put(menus::update_item)
                .delete(menus::delete_item),
        )
        .route(
            "/menus/:scope/items/:component_id/visibility",
            patch(menus::set_visibility),
        )
        .route("/menus/:scope/order", put(menus::reorder))
}

/// Permissive when no origins are configured
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
