pub mod adapters;
pub mod companies;
pub mod coordinator;
pub mod fetch;
