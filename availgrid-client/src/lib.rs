//! HTTP client for the student availability service.
//!
//! Implements [`availgrid_core::AvailabilityService`] over the service's
//! JSON API: the roster (`/students`), busy blocks (`/busy`) and the
//! free/busy grid (`/availability-grid`).
//!
//! # Example
//!
//! ```ignore
//! use availgrid_client::AvailabilityClient;
//! use availgrid_core::{GridRequest, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AvailabilityClient::new("http://localhost:8000");
//!     let mut session = Session::new(GridRequest::default());
//!
//!     session.load(&client).await.unwrap();
//!     session.load_grid(&client).await.unwrap();
//!
//!     let grid = session.grid().unwrap();
//!     println!("{} rows", grid.row_count());
//! }
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{AvailabilityClient, DEFAULT_BASE_URL};
pub use convert::{build_grid_body, error_message, parse_grid};
pub use error::ClientError;
pub use types::{CreateStudent, ErrorBody, GridRequestBody, GridResponse, StudentsResponse, WireCell};
