mod common;
mod mutator;
