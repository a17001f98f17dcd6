//! Player arsenal: profiles, runtime state and the firing pipeline

pub mod fire;
pub mod profile;
pub mod state;

pub use fire::{DamageSink, FireRequest, ResolvedHit, ShotReport, SplashCandidate, WeaponInfo, WeaponSystem};
pub use profile::{WeaponKind, WeaponProfile};
pub use state::WeaponRuntimeState;
