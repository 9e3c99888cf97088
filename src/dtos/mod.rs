pub mod auth;
pub mod catalog;
pub mod customer;
pub mod listing;
pub mod partner;
pub mod price;
