pub mod murajaah;
pub mod tilawah;
pub mod users;
