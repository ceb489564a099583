//! MailChimp member endpoints, always addressed through their list

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/mailchimp/lists/{list_id}/members", routes())
}

fn routes() -> Router<AppState> {
    Router::new().route("/", post(handler::create)).route(
        "/{member_id}",
        get(handler::show)
            .put(handler::update)
            .delete(handler::remove),
    )
}
