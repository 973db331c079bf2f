pub mod payment_model;
pub mod ticket;
