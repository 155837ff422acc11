pub mod chat;
pub mod common;
pub mod form;
pub mod notification;
