pub mod assignment;
pub mod class;
pub mod department;
pub mod import;
pub mod statistics;
pub mod subject;
pub mod teacher;
pub mod user;
