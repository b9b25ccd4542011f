//! Document model and collaborator contracts for sealconf.
//! Codecs and ciphers plug into the store through the traits in [`storage`];
//! concrete implementations live in `sealconf-storage`.

pub mod document;
pub mod storage;

pub use document::{Document, Value};
