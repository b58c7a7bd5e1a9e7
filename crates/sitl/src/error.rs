/// Errors that can occur while setting up or running a simulated mission.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    #[error("Drivebase construction failed: {0}")]
    Drivebase(String),

    #[error("Mission composition rejected: {0}")]
    Composition(String),

    #[error("Invalid argument for --{0}")]
    InvalidArgument(&'static str),
}
