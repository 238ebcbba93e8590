//! HTTP API handlers for tmt-ha

pub mod analyze;
pub mod buildinfo;
pub mod classes;
pub mod fuse;
pub mod health;
pub mod ui;

pub use analyze::analyze_crop;
pub use buildinfo::get_build_info;
pub use classes::list_classes;
pub use fuse::fuse_scores;
pub use health::health_routes;
pub use ui::ui_routes;
