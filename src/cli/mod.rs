//! CLI infrastructure for training and inspecting the robot agent

pub mod commands;
pub mod output;
