pub mod history;
pub mod league;
pub mod profile;
pub mod watermark;
