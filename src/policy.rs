mod action_values;
mod q_table;

pub use action_values::ActionValues;
pub use q_table::QTable;
