//! Query shaping - request parameters to fetch plans

pub mod executor;
pub mod params;
pub mod shaper;

pub use executor::QueryExecutor;
pub use params::{RequestParams, PARAM_DEPTH, PARAM_EXCLUDE, PARAM_ORDER_BY};
pub use shaper::{shape, FetchPlan};
