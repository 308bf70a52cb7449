//! Domain definitions.

pub mod audit;
pub mod dispute;
pub mod document;
pub mod property;
pub mod timeline;
pub mod transfer;
pub mod user;

pub use self::{
    dispute::Dispute, document::Document, property::Property,
    transfer::Transfer, user::User,
};
