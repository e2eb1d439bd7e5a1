pub mod lzo;
