pub mod common;

mod batch_tests;
mod chain_tests;
