#![allow(dead_code)]

pub mod batches;
