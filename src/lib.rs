pub mod avatar;
pub mod camera3d;
pub mod catalog;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod meeting;
pub mod panels;
pub mod roster;
pub mod session;
pub mod store;
pub mod tree;
pub mod vcs;

pub use error::WorkspaceError;
pub use session::{LocalUser, WorkspaceSession};

/// Wraps an angle into `[0, 2π)`.
pub(crate) fn wrap_angle(radians: f32) -> f32 {
    let two_pi = std::f32::consts::TAU;
    let wrapped = radians.rem_euclid(two_pi);
    if wrapped >= two_pi {
        0.0
    } else {
        wrapped
    }
}
