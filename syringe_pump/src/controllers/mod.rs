pub mod syringe_pump;
