//! Schema, scalars and resolvers for the card catalog.
//!
//! The schema is built once and shared. Every execution carries its own
//! [`RequestContext`] as request data, which holds the store handle and the
//! deadline store calls run under.

mod card;
pub mod context;
mod mutation;
mod query;
mod resolve;
mod scalars;
pub mod types;

use async_graphql::{EmptySubscription, Schema};

pub use card::CardNode;
pub use context::RequestContext;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[must_use]
pub fn build_schema() -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
