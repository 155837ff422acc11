pub mod chat;
pub mod dispatcher;
pub mod materials;
pub mod time_parser;
