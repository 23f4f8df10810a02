pub mod feature;
pub mod geography;
pub mod layout;
pub mod leg;
pub mod partition;
