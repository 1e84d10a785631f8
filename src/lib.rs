pub mod grades;
pub mod models;
pub mod output;
pub mod state;
pub mod stats;
pub mod storage;
pub mod views;
