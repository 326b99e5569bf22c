pub mod cancel;
pub mod clock;
