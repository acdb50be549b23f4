pub mod ask;
pub mod categories;
pub mod doctor;
pub mod gateway;
pub mod onboard;
