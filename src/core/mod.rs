pub mod filters;
pub mod params;
pub mod pipeline;
pub mod query;
pub mod shaper;
