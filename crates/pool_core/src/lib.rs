pub mod artifact;
pub mod decode;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod qubo;
pub mod routes;
pub mod scenario;
pub mod solver;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
