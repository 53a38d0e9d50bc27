//! Serializable tree edit vocabulary.
//!
//! Hosts that drive the editor over JSON describe structural edits as a batch
//! of [`TreeOp`]s which [`apply_ops`] folds over a forest.

mod ops;

pub use ops::{TreeOp, apply_op, apply_ops};
