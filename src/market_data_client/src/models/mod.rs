pub mod bar;
pub mod request_params;
pub mod symbol;
pub mod time_series;
