//! Backfills direction identifiers from a stop summary.
//!
//! The trips operations name a route's direction ("Eastbound") but usually
//! omit its identifier, which only the summary operation returns. Routes are
//! matched on route number plus direction name; names compare trimmed and
//! case-insensitively.
//!
//! Resolution never touches the caller's routes. [`reconcile`] returns
//! resolved copies, and [`Reconciled::merge_into`] writes the identifiers back
//! when the caller asks for it.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, ReconciliationError, Result};
use crate::model::{Direction, RouteDirection, RouteTrips, StopSummary};

/// A route that carries a direction to resolve.
pub trait DirectionTarget: Clone {
    fn route_number(&self) -> Option<i64>;
    fn direction(&self) -> &Direction;
    fn direction_mut(&mut self) -> &mut Direction;
}

impl DirectionTarget for RouteDirection {
    fn route_number(&self) -> Option<i64> {
        self.route_number
    }

    fn direction(&self) -> &Direction {
        &self.direction
    }

    fn direction_mut(&mut self) -> &mut Direction {
        &mut self.direction
    }
}

impl DirectionTarget for RouteTrips {
    fn route_number(&self) -> Option<i64> {
        self.route_number
    }

    fn direction(&self) -> &Direction {
        &self.direction
    }

    fn direction_mut(&mut self) -> &mut Direction {
        &mut self.direction
    }
}

/// A single value or a list; results mirror the shape of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            OneOrMany::One(item) => std::slice::from_mut(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    /// Gives `items` the shape of `self`. A `One` input always resolves to
    /// exactly one item; any other count stays a list.
    fn reshape<U>(&self, items: Vec<U>) -> OneOrMany<U> {
        match (self, <[U; 1]>::try_from(items)) {
            (OneOrMany::One(_), Ok([item])) => OneOrMany::One(item),
            (_, Ok(items)) => OneOrMany::Many(items.into()),
            (_, Err(items)) => OneOrMany::Many(items),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Write resolved identifiers into the returned routes.
    pub insert: bool,
    /// Replace identifiers the routes already carry.
    pub overwrite: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            insert: true,
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciled<T> {
    pub routes: OneOrMany<T>,
    pub identifiers: OneOrMany<i64>,
}

impl<T: DirectionTarget> Reconciled<T> {
    /// Copies the resolved direction identifiers onto `targets`, which must be
    /// the routes this result was resolved from, in the same order.
    pub fn merge_into(&self, targets: &mut [T]) {
        for (target, resolved) in targets.iter_mut().zip(self.routes.as_slice()) {
            target.direction_mut().id = resolved.direction().id;
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Checks that every route has a number and a direction name.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first route that does not.
pub fn validate_routes<T: DirectionTarget>(routes: &[T]) -> Result<()> {
    for route in routes {
        if route.route_number().is_none() {
            return Err(Error::Validation(
                "Route has missing or invalid route number.".to_string(),
            ));
        }

        if route.direction().name.trim().is_empty() {
            return Err(Error::Validation(
                "Direction name cannot be empty!".to_string(),
            ));
        }
    }

    Ok(())
}

fn resolve(stop: i64, summary: &StopSummary, route: i64, direction_name: &str) -> Result<i64> {
    let wanted = normalize(direction_name);
    let mut has_route = false;

    for candidate in &summary.routes {
        if candidate.route_number != Some(route) {
            continue;
        }
        has_route = true;

        if normalize(&candidate.direction.name) != wanted {
            continue;
        }

        match candidate.direction.id {
            Some(id) => return Ok(id),
            None => {
                debug!(route, direction = %direction_name, "Summary direction has no usable id");
            }
        }
    }

    let err = if has_route {
        ReconciliationError::UnknownDirection {
            stop,
            route,
            direction: direction_name.to_string(),
        }
    } else {
        ReconciliationError::UnknownRoute { stop, route }
    };

    Err(err.into())
}

/// Resolves the direction identifier of every route in `routes` against
/// `summary`, stopping at the first route that cannot be resolved.
///
/// # Errors
///
/// [`Error::Validation`] for a route without a number or direction name, and
/// [`Error::Reconciliation`] when the summary is empty or lacks a route or
/// direction.
pub fn reconcile<T: DirectionTarget>(
    stop: i64,
    summary: &StopSummary,
    routes: &OneOrMany<T>,
    options: ReconcileOptions,
) -> Result<Reconciled<T>> {
    validate_routes(routes.as_slice())?;

    if summary.routes.is_empty() {
        return Err(ReconciliationError::NoRoutes { stop }.into());
    }

    let mut resolved = Vec::with_capacity(routes.as_slice().len());
    let mut identifiers = Vec::with_capacity(routes.as_slice().len());

    for route in routes.as_slice() {
        let number = route.route_number().unwrap_or_default();
        let id = resolve(stop, summary, number, &route.direction().name)?;

        let mut route = route.clone();
        if options.insert && (route.direction().id.is_none() || options.overwrite) {
            route.direction_mut().id = Some(id);
        }

        resolved.push(route);
        identifiers.push(id);
    }

    Ok(Reconciled {
        routes: routes.reshape(resolved),
        identifiers: routes.reshape(identifiers),
    })
}
