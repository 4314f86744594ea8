pub mod documentation;
pub mod health_service;
pub mod password;
pub mod read_model;
pub mod reaper;
pub mod room_service;
pub mod statistics;
pub mod vote_service;
