pub mod haversine;
pub mod vectorized;
