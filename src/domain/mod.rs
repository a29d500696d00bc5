// Domain layer: scan model, the scan builder and the ports it talks through.

pub mod model;
pub mod ports;
pub mod scan;
