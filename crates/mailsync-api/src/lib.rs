//! # mailsync-api
//!
//! REST façade over the list and member synchronizers.
//!
//! | method | path | operation |
//! |--------|------|-----------|
//! | POST | `/mailchimp/lists` | create list |
//! | GET/PUT/DELETE | `/mailchimp/lists/{list_id}` | read/update/delete list |
//! | POST | `/mailchimp/lists/{list_id}/members` | create member |
//! | GET/PUT/DELETE | `/mailchimp/lists/{list_id}/members/{member_id}` | read/update/delete member |
//! | GET | `/health` | liveness |
//!
//! Status codes: 200 on success (`{}` for deletes), 404 for unknown list or
//! member, 400 for invalid data, a provider failure or deleting a list that
//! still has members, 500 for local storage failures.

pub mod error;
pub mod extract;
pub mod health;
pub mod lists;
pub mod members;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::router;
pub use state::AppState;
