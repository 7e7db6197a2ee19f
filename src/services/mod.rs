pub mod music_api;
