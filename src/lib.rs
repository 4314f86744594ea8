//! Library crate for wildguess-back: planning-poker rooms coordinated over
//! HTTP polling, with a background reaper for members that went silent.

pub mod auth;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
