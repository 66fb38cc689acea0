use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::day::Weekday;
use crate::grid::{GridRequest, RawGrid};
use crate::time::Time24;

/// A weekly interval during which a student cannot work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyBlock {
    pub name: String,
    pub day: Weekday,
    pub start: Time24,
    pub end: Time24,
}

/// The external store of students and busy blocks, and the service that
/// turns them into a free/busy grid.
///
/// Validation (empty or duplicate names, malformed times) is the
/// collaborator's job; its errors are shown to the user as they are.
pub trait AvailabilityService {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current roster, in service order.
    fn list_students(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    fn add_student(&self, name: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn delete_student(&self, name: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn add_busy(&self, block: &BusyBlock) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// One round trip for the grid described by `request`.
    ///
    /// Callers pass a request that already passed [`GridRequest::validate`].
    fn fetch_grid(
        &self,
        request: &GridRequest,
    ) -> impl Future<Output = Result<RawGrid, Self::Error>> + Send;
}
