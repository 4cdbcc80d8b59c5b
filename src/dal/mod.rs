pub mod intent_example_db;
pub mod lead_db;
