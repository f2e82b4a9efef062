pub mod forecast;
pub mod sun_table;
pub mod features;
