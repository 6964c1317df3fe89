// Infrastructure layer module
// Contains adapters for the domain's storage ports
// Follows Hexagonal Architecture

pub mod repositories;
