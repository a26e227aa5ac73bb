use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::bearer_gate;
use crate::handlers;
use crate::state::AppState;

/// Assemble the full application router. Everything except /health sits
/// behind the bearer gate.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(task_routes())
        .merge(event_routes())
        .merge(reminder_routes())
        .merge(chat_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), bearer_gate));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/internal", get(auth::auth_internal))
        .route("/auth/client", get(auth::auth_client))
}

fn task_routes() -> Router<AppState> {
    use handlers::tasks;

    Router::new()
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/:id",
            get(tasks::get).patch(tasks::update).delete(tasks::delete),
        )
}

fn event_routes() -> Router<AppState> {
    use handlers::events;

    Router::new()
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/:id",
            get(events::get).patch(events::update).delete(events::delete),
        )
}

fn reminder_routes() -> Router<AppState> {
    use handlers::reminders;

    Router::new()
        .route("/reminders", get(reminders::list).post(reminders::create))
        .route(
            "/reminders/:id",
            get(reminders::get)
                .patch(reminders::update)
                .delete(reminders::delete),
        )
}

fn chat_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::chat;

    Router::new()
        .route("/chat/conversation", post(chat::create_conversation))
        .route("/chat/conversations", get(chat::list_conversations))
        .route(
            "/chat/:id/messages",
            get(chat::list_messages).post(chat::create_message),
        )
}
