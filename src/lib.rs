pub mod core;
pub mod utils;
pub mod gateway;
pub mod patrons;
pub mod catalog;
pub mod lending;
pub mod reservations;
