pub mod check;
pub mod derive;
pub mod models;
