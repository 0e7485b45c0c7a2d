pub mod relieving;
