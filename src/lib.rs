pub mod address_book;
pub mod export;
pub mod gui;
pub mod logging;
pub mod mail;
pub mod record;
pub mod send;
pub mod settings;
pub mod signature;
