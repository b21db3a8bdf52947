pub mod drivers;
pub mod maintenance;
pub mod trips;
pub mod vehicles;
