pub mod translation_pipeline;
pub mod translation_cache;
pub mod page_table;
pub mod frame_pool;
