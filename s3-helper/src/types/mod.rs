pub mod object;
pub mod params;
