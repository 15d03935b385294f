pub mod entries;
pub mod redirect;
