pub mod chart_data;
pub mod table;
