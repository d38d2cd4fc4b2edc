// tests/property/main.rs

mod cascade_order;
mod catalog_sorting;
