pub mod studio_gate;
