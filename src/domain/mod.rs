// Domain layer: core models and ports (interfaces). No I/O.

pub mod model;
pub mod ports;
