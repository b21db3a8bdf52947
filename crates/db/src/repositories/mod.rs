//! Query functions, one zero-sized repo per table.
//!
//! Read-only lookups take the pool. Functions that lock rows or take part in
//! a multi-statement update take a `&mut PgConnection`, which is what a
//! `Transaction` derefs to.

pub mod driver_repo;
pub mod maintenance_repo;
pub mod trip_repo;
pub mod vehicle_repo;

pub use driver_repo::DriverRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use trip_repo::TripRepo;
pub use vehicle_repo::VehicleRepo;
