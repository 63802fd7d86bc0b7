pub mod hit;
pub mod svg;

pub use hit::{hit_test, hit_test_rect};
pub use svg::export_svg;
