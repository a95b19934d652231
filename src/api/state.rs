use std::{convert::Infallible, sync::Arc};

use warp::{reject::Rejection, Filter};

use crate::{
    jwt::{SessionData, SessionKeys},
    middleware::{with_possible_session, with_session},
    store::Store,
};

/// Everything a handler needs, shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: Arc<SessionKeys>,
    pub page_size: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: SessionKeys, page_size: i64) -> Self {
        Self {
            store,
            keys: Arc::new(keys),
            page_size,
        }
    }

    pub fn session(&self) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
        with_session(self.keys.clone())
    }

    pub fn possible_session(
        &self,
    ) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
        with_possible_session(self.keys.clone())
    }
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
