pub mod generate;
pub mod misorientation;
pub mod pair;
