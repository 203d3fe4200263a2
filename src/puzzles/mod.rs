//! Self-contained puzzle solvers. None of these touch VM internals; each
//! takes plain numeric input and returns a plain numeric or textual answer,
//! consistent with their role as collaborators specified only by interface.

pub mod call6027;
pub mod coins;
pub mod vault;
