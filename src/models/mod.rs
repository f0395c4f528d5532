// Data models for pose analysis

pub mod discipline;
pub mod joint_angles;
pub mod landmark;
pub mod pose_data;

pub use discipline::*;
pub use joint_angles::*;
pub use landmark::*;
pub use pose_data::*;
