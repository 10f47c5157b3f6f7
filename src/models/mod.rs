pub mod constraint;
pub mod form;
