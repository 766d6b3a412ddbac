pub mod blocked;
pub mod dedupe;
pub mod extract;
pub mod fetch;
pub mod helpers;
pub mod products;
pub mod search;
