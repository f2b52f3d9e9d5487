pub mod base_case;
pub mod critical_temp;
pub mod grid;
pub mod report;
pub mod screen;
pub mod sweep;
pub mod util;
