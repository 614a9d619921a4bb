pub mod lookup;
pub mod table;
