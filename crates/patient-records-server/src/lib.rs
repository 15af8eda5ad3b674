//! HTTP service for managing patient records.
//!
//! Routes:
//!
//! | Verb   | Path                    | Handler              |
//! |--------|-------------------------|----------------------|
//! | GET    | `/`                     | [`handlers::root`]   |
//! | GET    | `/about`                | [`handlers::about`]  |
//! | GET    | `/view`                 | [`handlers::view`]   |
//! | GET    | `/search/{patient_id}`  | [`handlers::search`] |
//! | GET    | `/sort`                 | [`handlers::sort`]   |
//! | POST   | `/create`               | [`handlers::create`] |
//! | PUT    | `/update/{patient_id}`  | [`handlers::update`] |
//! | DELETE | `/delete/{patient_id}`  | [`handlers::delete`] |

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use patient_records_core::{PatientService, PatientStore};
use tower_http::trace::TraceLayer;

pub use config::{Backend, Config};
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PatientService>,
}

impl AppState {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self {
            service: Arc::new(PatientService::new(store)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/about", get(handlers::about))
        .route("/view", get(handlers::view))
        .route("/search/:patient_id", get(handlers::search))
        .route("/sort", get(handlers::sort))
        .route("/create", post(handlers::create))
        .route("/update/:patient_id", put(handlers::update))
        .route("/delete/:patient_id", delete(handlers::delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
