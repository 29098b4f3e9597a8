pub mod history;
pub mod track;
pub mod video_id;
