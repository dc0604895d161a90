//! Queries, one module per tracker. Every function is scoped to a user id.

pub mod murajaah;
pub mod sabaq;
pub mod surah;
pub mod tahajjud;
pub mod tilawah;
pub mod users;
