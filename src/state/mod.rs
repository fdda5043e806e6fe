pub mod channel;
pub mod data_series;
pub mod layout;
pub mod session;
pub mod theme;
