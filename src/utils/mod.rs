pub mod crypto;
pub mod geo;
pub mod html;
pub mod token;
pub mod validation;
