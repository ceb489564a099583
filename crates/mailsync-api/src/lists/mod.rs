//! MailChimp list endpoints

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/mailchimp/lists", routes())
}

fn routes() -> Router<AppState> {
    Router::new().route("/", post(handler::create)).route(
        "/{list_id}",
        get(handler::show)
            .put(handler::update)
            .delete(handler::remove),
    )
}
