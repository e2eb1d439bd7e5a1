pub mod cipher;
pub mod compression;
