// Goals: kinds, progress evaluation against synced stats, and the CRUD API.

pub mod evaluator;
pub mod handlers;
pub mod kind;
pub mod repository;
