#[allow(non_snake_case)]
pub mod CompressibleSystem;
#[allow(non_snake_case)]
pub mod ErrorEstimators;
#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod FluxSchemes;
#[allow(non_snake_case)]
pub mod FunctionObjects;
#[allow(non_snake_case)]
pub mod Mesh;
#[allow(non_snake_case)]
pub mod Reacting;
#[allow(non_snake_case)]
pub mod Thermodynamics;
#[allow(non_snake_case)]
pub mod TimeIntegration;
#[allow(non_snake_case)]
pub mod Utils;
pub mod config;
