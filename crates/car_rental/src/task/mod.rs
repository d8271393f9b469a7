mod status_sweep;

pub use status_sweep::status_sweep_service;
