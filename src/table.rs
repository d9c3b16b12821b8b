mod constraint;
mod path_table;
mod reservation;

pub use constraint::ConstraintTable;
pub use path_table::PathTableWC;
pub(crate) use reservation::ReservationTable;
