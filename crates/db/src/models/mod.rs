//! Row structs and insert DTOs.

pub mod audit;
pub mod page_content;
