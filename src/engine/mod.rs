pub mod multi_hop;
pub mod optimizer;
pub mod pricing;
pub mod service;
pub mod swap;
