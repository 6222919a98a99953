//! Solvers
//!
//! Numeric solvers behind the adjusted strategies. `qp` and `linalg` serve the Friedman
//! correction, `hellinger` searches the HDy mixture. Both programs are handed to clarabel
//! through `conic`.
pub mod conic;
pub mod hellinger;
pub mod linalg;
pub mod qp;
