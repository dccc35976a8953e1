pub mod walk;

pub use walk::{discover_video_files, has_video_extension, scan_root};
