pub mod crosshair;
pub mod readout;
pub mod surface;
pub mod time_axis;
