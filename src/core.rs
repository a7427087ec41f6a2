pub mod clock;
pub mod command;
pub mod controller;
pub mod domain;
pub mod events;
pub mod factory;
pub mod library;
pub mod repository;
pub mod transaction;
