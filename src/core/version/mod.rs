pub mod product_version;

pub use product_version::ProductVersion;
