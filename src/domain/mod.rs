pub mod intent;
pub mod lead;
