pub use patronus_macros::patronus;
