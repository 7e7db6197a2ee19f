pub mod analysis;
pub mod collect;
pub mod enrich;
pub mod fetch;
pub mod infra;
pub mod input;
pub mod output;
pub mod rank;
pub mod recommend;
pub mod services;
pub mod stats;
