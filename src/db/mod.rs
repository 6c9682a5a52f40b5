pub mod postgres;
pub mod store;

pub use postgres::{create_pool, run_migrations, PgAffinityStore};
pub use store::{AffinityStore, CandidateQuery};

#[cfg(test)]
pub use store::MockAffinityStore;
