pub mod completion;
pub mod evaluator;
pub mod generator;
pub mod negotiation;
pub mod roster;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod fixtures;
