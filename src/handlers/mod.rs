pub mod auth;
pub mod brand;
pub mod category;
pub mod customer;
pub mod partner;
pub mod price;
pub mod product;
pub mod relay;
