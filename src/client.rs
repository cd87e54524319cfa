//! The public entry point: the four operations a caller can run against a stop.

use tracing::{debug, info};

use crate::assemble;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{BasicClient, Fetcher, HttpFetcher, Operation, Query};
use crate::model::{QueryOptions, StopSummary, StopTrips};
use crate::reconcile::{
    DirectionTarget, OneOrMany, ReconcileOptions, Reconciled, reconcile, validate_routes,
};

/// Client for the provider's stop and trip operations.
///
/// Every request is made with the credentials of the [`Config`] given at
/// construction; nothing is shared between clients.
pub struct OcTranspo<F = HttpFetcher> {
    config: Config,
    fetcher: F,
}

impl OcTranspo<HttpFetcher> {
    /// A client that talks HTTP to `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(BasicClient::new()?, config.base_url.clone());
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> OcTranspo<F> {
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch(
        &self,
        operation: Operation,
        stop_number: i64,
        route_number: Option<i64>,
    ) -> Result<serde_json::Value> {
        let query = Query {
            credentials: &self.config.credentials,
            stop_number,
            route_number,
        };
        debug!(%operation, stop = stop_number, route = ?route_number, "Fetching");
        Ok(self.fetcher.fetch(operation, &query).await?)
    }

    /// Routes and directions served by `stop`, with their direction ids.
    ///
    /// # Errors
    ///
    /// Transport failures, malformed payloads and provider error codes.
    #[tracing::instrument(skip(self, options))]
    pub async fn get_stop_summary(
        &self,
        stop: i64,
        options: QueryOptions,
    ) -> Result<StopSummary> {
        let payload = self
            .fetch(Operation::GetRouteSummaryForStop, stop, None)
            .await?;
        let summary = assemble::stop_summary(&payload, options)?;
        info!(routes = summary.routes.len(), "Stop summary fetched");
        Ok(summary)
    }

    /// Next trips for one route at `stop`, with direction ids resolved
    /// from the stop summary.
    ///
    /// Takes two round trips: the trips, then the summary.
    ///
    /// # Errors
    ///
    /// As [`Self::get_stop_summary`], plus [`crate::Error::Reconciliation`]
    /// when a returned direction is not in the summary.
    #[tracing::instrument(skip(self, options))]
    pub async fn get_route_information(
        &self,
        stop: i64,
        route: i64,
        options: QueryOptions,
    ) -> Result<StopTrips> {
        let payload = self
            .fetch(Operation::GetNextTripsForStop, stop, Some(route))
            .await?;
        let mut trips = assemble::route_trips(&payload, options)?;

        if !trips.routes.is_empty() {
            let stop_number = trips.stop_number.unwrap_or(stop);
            let routes = OneOrMany::Many(std::mem::take(&mut trips.routes));
            let resolved = self
                .get_route_direction_identifiers(
                    stop_number,
                    &routes,
                    ReconcileOptions::default(),
                )
                .await?;
            trips.routes = resolved.routes.into_vec();
        }

        info!(routes = trips.routes.len(), "Route trips fetched");
        Ok(trips)
    }

    /// Next trips for every route at `stop`. Direction ids are whatever the
    /// provider included; no reconciliation is done.
    ///
    /// # Errors
    ///
    /// As [`Self::get_stop_summary`].
    #[tracing::instrument(skip(self, options))]
    pub async fn get_stop_information(
        &self,
        stop: i64,
        options: QueryOptions,
    ) -> Result<StopTrips> {
        let payload = self
            .fetch(Operation::GetNextTripsForStopAllRoutes, stop, None)
            .await?;
        let trips = assemble::all_route_trips(&payload, options)?;
        info!(routes = trips.routes.len(), "Stop trips fetched");
        Ok(trips)
    }

    /// Resolves the direction identifiers of `routes` from a fresh summary of
    /// `stop`. The result has the same shape as `routes`; the input itself is
    /// never modified (see [`Reconciled::merge_into`]).
    ///
    /// # Errors
    ///
    /// [`crate::Error::Validation`] for routes without a number or direction
    /// name (no request is made), otherwise as [`Self::get_stop_summary`] and
    /// [`crate::Error::Reconciliation`].
    #[tracing::instrument(skip(self, routes, options))]
    pub async fn get_route_direction_identifiers<T: DirectionTarget>(
        &self,
        stop: i64,
        routes: &OneOrMany<T>,
        options: ReconcileOptions,
    ) -> Result<Reconciled<T>> {
        validate_routes(routes.as_slice())?;

        if let OneOrMany::Many(list) = routes {
            if list.is_empty() {
                return Ok(Reconciled {
                    routes: OneOrMany::Many(Vec::new()),
                    identifiers: OneOrMany::Many(Vec::new()),
                });
            }
        }

        let summary = self.get_stop_summary(stop, QueryOptions::default()).await?;
        reconcile(stop, &summary, routes, options)
    }
}
