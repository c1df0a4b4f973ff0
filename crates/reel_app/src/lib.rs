//! Reel app wiring: pumps engine events through the core update function and
//! dispatches the resulting effects back into the engine.
pub mod bridge;
pub mod logging;
pub mod runner;
