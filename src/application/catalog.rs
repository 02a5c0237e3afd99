use crate::domain::ids::TourId;
use crate::domain::ports::SharedTourApi;
use crate::domain::tour::{Tour, TourPage, TourQuery};
use crate::error::Result;
use tracing::debug;

/// Read-only access to the tour catalog.
pub struct TourCatalog {
    api: SharedTourApi,
}

impl TourCatalog {
    pub fn new(api: SharedTourApi) -> Self {
        Self { api }
    }

    pub async fn browse(&self, query: &TourQuery) -> Result<TourPage> {
        debug!(?query, "browsing tours");
        self.api
            .list(query.clone())
            .await
            .map_err(|e| e.into_request_failure("Failed to load tours"))
    }

    pub async fn tour(&self, id: &TourId) -> Result<Tour> {
        self.api
            .get(id)
            .await
            .map_err(|e| e.into_request_failure("Failed to load tour"))
    }
}
