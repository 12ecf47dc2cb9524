pub mod base;
pub mod yahoo;
pub mod alpha_vantage;
