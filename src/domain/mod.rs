// Domain layer: records and the ports (interfaces) the engine drives.

pub mod model;
pub mod ports;
