// Repository interfaces (ports)
// Implemented by adapters in the infrastructure layer

pub mod roster_repository;

pub use roster_repository::RosterRepository;
