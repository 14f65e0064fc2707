//! Route wiring.

use axum::Router;
use axum::routing::{delete, get, post, put};
use surrealdb::Connection;

use crate::handlers::{auth, customer, init};
use crate::middleware::{require_auth, require_manager};
use crate::state::AppState;

/// Build the complete API router, everything nested under `/api`.
pub fn build_router<C: Connection>(state: AppState<C>) -> Router {
    let manager = Router::new()
        .route("/auth/register", post(auth::register::<C>))
        .route("/auth/users", get(auth::list_users::<C>))
        .route(
            "/auth/users/{id}",
            put(auth::update_user::<C>).delete(auth::delete_user::<C>),
        )
        .layer(axum::middleware::from_fn(require_manager));

    let authed = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/clientes",
            get(customer::list::<C>).post(customer::create::<C>),
        )
        .route(
            "/clientes/{id}",
            get(customer::get::<C>)
                .put(customer::update::<C>)
                .delete(customer::remove::<C>),
        )
        .route("/clientes/{id}/historico", post(customer::add_history::<C>))
        .route(
            "/clientes/{id}/historico/{hid}",
            delete(customer::delete_history::<C>),
        )
        .route("/clientes/{id}/fotos", post(customer::add_photo::<C>))
        .merge(manager)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth::<C>,
        ));

    let public = Router::new()
        .route("/auth/login", post(auth::login::<C>))
        .route("/init-admin", post(init::init_admin::<C>));

    Router::new()
        .nest("/api", public.merge(authed))
        .with_state(state)
}
